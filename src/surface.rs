//! Host surface abstraction: URL fragment, navigation, and status reporting.

// crates.io
use tokio::time;
// self
use crate::_prelude::*;

/// Path of the sign-in page, which doubles as the OAuth callback target.
pub const SIGN_IN_PATH: &str = "/auth";
/// Path of the authenticated landing page.
pub const LANDING_PATH: &str = "/dashboard";
/// Delay before a post-success navigation, so the status message stays visible.
pub const REDIRECT_DELAY: Duration = Duration::from_millis(500);

/// Severity cue attached to user-visible status text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusLevel {
	/// Informational message.
	Info,
	/// Error message; rendered with the error color cue.
	Error,
}
impl StatusLevel {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StatusLevel::Info => "info",
			StatusLevel::Error => "error",
		}
	}
}
impl Display for StatusLevel {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Contract between the bridge and the hosting page or shell.
///
/// This is the only seam through which the bridge observes or mutates the
/// visible address and status area, which keeps every handler testable against
/// [`MemorySurface`].
pub trait Surface
where
	Self: Send + Sync,
{
	/// Returns the current URL fragment (without the leading `#`), if any.
	fn fragment(&self) -> Option<String>;

	/// Removes the fragment from the visible address.
	fn scrub_fragment(&self);

	/// Returns the origin the page is served from.
	fn origin(&self) -> Url;

	/// Returns the path of the current location.
	fn current_path(&self) -> String;

	/// Navigates to `target`, a same-origin path or an absolute URL.
	fn navigate(&self, target: &str);

	/// Shows `text` in the status area with the given color cue.
	fn show_status(&self, level: StatusLevel, text: &str);
}

/// Navigates after [`REDIRECT_DELAY`] so the current status message is visible
/// before the location changes.
pub async fn redirect_soon(surface: &dyn Surface, target: &str) {
	time::sleep(REDIRECT_DELAY).await;
	surface.navigate(target);
}

#[derive(Debug)]
struct MemorySurfaceState {
	origin: Url,
	path: String,
	fragment: Option<String>,
	scrubs: u32,
	statuses: Vec<(StatusLevel, String)>,
	navigations: Vec<String>,
}

/// In-memory [`Surface`] for tests and headless embedding.
#[derive(Clone, Debug)]
pub struct MemorySurface(Arc<RwLock<MemorySurfaceState>>);
impl MemorySurface {
	/// Creates a surface positioned on the sign-in page with no fragment.
	pub fn new(origin: Url) -> Self {
		Self(Arc::new(RwLock::new(MemorySurfaceState {
			origin,
			path: SIGN_IN_PATH.into(),
			fragment: None,
			scrubs: 0,
			statuses: Vec::new(),
			navigations: Vec::new(),
		})))
	}

	/// Sets the current URL fragment (without the leading `#`).
	pub fn set_fragment(&self, fragment: impl Into<String>) {
		self.0.write().fragment = Some(fragment.into());
	}

	/// Sets the current location path.
	pub fn set_path(&self, path: impl Into<String>) {
		self.0.write().path = path.into();
	}

	/// Number of times the fragment was scrubbed.
	pub fn scrub_count(&self) -> u32 {
		self.0.read().scrubs
	}

	/// Recorded status messages, oldest first.
	pub fn statuses(&self) -> Vec<(StatusLevel, String)> {
		self.0.read().statuses.clone()
	}

	/// Recorded navigation targets, oldest first.
	pub fn navigations(&self) -> Vec<String> {
		self.0.read().navigations.clone()
	}
}
impl Default for MemorySurface {
	fn default() -> Self {
		Self::new(
			Url::parse("http://localhost:5002")
				.unwrap_or_else(|_| unreachable!("The default origin literal is a valid URL.")),
		)
	}
}
impl Surface for MemorySurface {
	fn fragment(&self) -> Option<String> {
		self.0.read().fragment.clone()
	}

	fn scrub_fragment(&self) {
		let mut guard = self.0.write();

		guard.fragment = None;
		guard.scrubs += 1;
	}

	fn origin(&self) -> Url {
		self.0.read().origin.clone()
	}

	fn current_path(&self) -> String {
		self.0.read().path.clone()
	}

	fn navigate(&self, target: &str) {
		self.0.write().navigations.push(target.to_owned());
	}

	fn show_status(&self, level: StatusLevel, text: &str) {
		self.0.write().statuses.push((level, text.to_owned()));
	}
}
