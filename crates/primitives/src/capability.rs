use std::fmt;

/// Dotted path into a capability tree (`tools.enabled`, `json.native`).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CapabilityPath {
	segments: Box<[Box<str>]>,
}

impl CapabilityPath {
	/// Splits `path` on `.`, discarding empty segments.
	pub fn new(path: &str) -> Self {
		Self {
			segments: path
				.split('.')
				.map(str::trim)
				.filter(|s| !s.is_empty())
				.map(Box::from)
				.collect(),
		}
	}

	pub fn segments(&self) -> impl Iterator<Item = &str> + '_ {
		self.segments.iter().map(|s| &**s)
	}

	pub fn len(&self) -> usize {
		self.segments.len()
	}

	pub fn is_empty(&self) -> bool {
		self.segments.is_empty()
	}
}

impl From<&str> for CapabilityPath {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

impl fmt::Display for CapabilityPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, segment) in self.segments.iter().enumerate() {
			if i > 0 {
				f.write_str(".")?;
			}
			f.write_str(segment)?;
		}
		Ok(())
	}
}

impl fmt::Debug for CapabilityPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "CapabilityPath({self})")
	}
}
