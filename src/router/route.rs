//! Typed route descriptors matched by structural path-segment comparison.
//!
//! A [`RouteTable`] is an ordered list. Resolution walks it top to bottom and the first
//! route whose method and segments match wins, so declaration order is the priority order.
//! [`RouteTable::conflicts`] reports pairs of routes that could both match one concrete
//! request; the standard table has none.

// self
use crate::_prelude::*;

/// One path segment of a route pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment {
	/// Segment that must equal the literal exactly.
	Literal(&'static str),
	/// Segment captured verbatim under the given parameter name; never empty.
	Param(&'static str),
}
impl Segment {
	fn matches(self, value: &str) -> bool {
		match self {
			Self::Literal(literal) => literal == value,
			Self::Param(_) => !value.is_empty(),
		}
	}

	fn overlaps(self, other: Self) -> bool {
		match (self, other) {
			(Self::Literal(a), Self::Literal(b)) => a == b,
			(Self::Param(_), Self::Literal(literal)) | (Self::Literal(literal), Self::Param(_)) =>
				!literal.is_empty(),
			(Self::Param(_), Self::Param(_)) => true,
		}
	}
}

/// Handler identity of a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RouteKind {
	/// `GET /sites`: every site the application can reach.
	ListSites,
	/// `GET /sites/{siteId}/drives`: document libraries of a site.
	SiteDrives,
	/// `GET /drives/{driveId}/root/children`: items at a library root.
	DriveRootChildren,
	/// `GET /drives/{driveId}/items/{itemId}/content`: temporary download URL of a file.
	ItemContent,
	/// `GET /search?q=`: search across list items and drive items.
	Search,
}
impl RouteKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::ListSites => "list_sites",
			Self::SiteDrives => "site_drives",
			Self::DriveRootChildren => "drive_root_children",
			Self::ItemContent => "item_content",
			Self::Search => "search",
		}
	}

	/// Binds captured parameters into a typed operation, or `None` if one is missing.
	fn bind(self, params: &PathParams) -> Option<Operation> {
		let param = |name: &str| params.get(name).map(str::to_owned);

		Some(match self {
			Self::ListSites => Operation::ListSites,
			Self::SiteDrives => Operation::SiteDrives { site_id: param("siteId")? },
			Self::DriveRootChildren => Operation::DriveRootChildren { drive_id: param("driveId")? },
			Self::ItemContent =>
				Operation::ItemContent { drive_id: param("driveId")?, item_id: param("itemId")? },
			Self::Search => Operation::Search,
		})
	}
}
impl Display for RouteKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Typed downstream operation with its path parameters bound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
	/// List all accessible sites.
	ListSites,
	/// List the drives of one site.
	SiteDrives {
		/// Site identifier, verbatim from the path.
		site_id: String,
	},
	/// List the root children of one drive.
	DriveRootChildren {
		/// Drive identifier, verbatim from the path.
		drive_id: String,
	},
	/// Resolve the download URL of one drive item.
	ItemContent {
		/// Drive identifier, verbatim from the path.
		drive_id: String,
		/// Item identifier, verbatim from the path.
		item_id: String,
	},
	/// Run a search; the query comes from the query string.
	Search,
}

/// Captured `name -> value` pairs in path order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(&'static str, String)>);
impl PathParams {
	/// Returns the value captured for `name`.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.0.iter().find(|(key, _)| *key == name).map(|(_, value)| value.as_str())
	}

	/// Number of captured parameters.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` if nothing was captured.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Method + segment pattern + handler identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
	/// HTTP verb the route answers.
	pub method: Method,
	/// Ordered path segments.
	pub segments: Vec<Segment>,
	/// Handler identity.
	pub kind: RouteKind,
}
impl Route {
	/// Creates a route.
	pub fn new(method: Method, segments: impl Into<Vec<Segment>>, kind: RouteKind) -> Self {
		Self { method, segments: segments.into(), kind }
	}

	/// Shorthand for a `GET` route.
	pub fn get(segments: impl Into<Vec<Segment>>, kind: RouteKind) -> Self {
		Self::new(Method::GET, segments, kind)
	}

	/// Matches `method` + `path`, returning the captured parameters on success.
	///
	/// Paths must start with `/`; a trailing slash yields an empty final segment and so
	/// never matches.
	pub fn matches(&self, method: &str, path: &str) -> Option<PathParams> {
		if self.method.as_str() != method {
			return None;
		}

		let rest = path.strip_prefix('/')?;
		let mut parts = rest.split('/');
		let mut params = PathParams::default();

		for segment in &self.segments {
			let part = parts.next()?;

			if !segment.matches(part) {
				return None;
			}
			if let Segment::Param(name) = segment {
				params.0.push((*name, part.to_owned()));
			}
		}

		if parts.next().is_some() {
			return None;
		}

		Some(params)
	}

	/// Returns `true` if some concrete request could match both routes.
	pub fn overlaps(&self, other: &Self) -> bool {
		self.method == other.method
			&& self.segments.len() == other.segments.len()
			&& self.segments.iter().zip(&other.segments).all(|(a, b)| a.overlaps(*b))
	}

	/// Renders the pattern, e.g. `GET /sites/{siteId}/drives`.
	pub fn template(&self) -> String {
		let mut out = format!("{} ", self.method);

		for segment in &self.segments {
			out.push('/');

			match segment {
				Segment::Literal(literal) => out.push_str(literal),
				Segment::Param(name) => {
					out.push('{');
					out.push_str(name);
					out.push('}');
				},
			}
		}

		out
	}
}

/// Result of resolving a request against a [`RouteTable`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMatch<'a> {
	/// Route that won.
	pub route: &'a Route,
	/// Operation bound from the captured parameters.
	pub operation: Operation,
}

/// Ordered route list; earlier routes take priority.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteTable(Vec<Route>);
impl RouteTable {
	/// Creates a table from routes listed in priority order.
	pub fn new(routes: impl Into<Vec<Route>>) -> Self {
		Self(routes.into())
	}

	/// The gateway's route table, in priority order:
	///
	/// 1. `GET /sites`
	/// 2. `GET /sites/{siteId}/drives`
	/// 3. `GET /drives/{driveId}/root/children`
	/// 4. `GET /drives/{driveId}/items/{itemId}/content`
	/// 5. `GET /search`
	///
	/// No two entries can match the same request, so the order only matters for routes
	/// added later.
	pub fn standard() -> Self {
		use Segment::{Literal, Param};

		Self::new([
			Route::get([Literal("sites")], RouteKind::ListSites),
			Route::get([Literal("sites"), Param("siteId"), Literal("drives")], RouteKind::SiteDrives),
			Route::get(
				[Literal("drives"), Param("driveId"), Literal("root"), Literal("children")],
				RouteKind::DriveRootChildren,
			),
			Route::get(
				[
					Literal("drives"),
					Param("driveId"),
					Literal("items"),
					Param("itemId"),
					Literal("content"),
				],
				RouteKind::ItemContent,
			),
			Route::get([Literal("search")], RouteKind::Search),
		])
	}

	/// Routes in priority order.
	pub fn routes(&self) -> &[Route] {
		&self.0
	}

	/// Returns the first route matching `method` + `path` with its bound operation.
	pub fn resolve(&self, method: &str, path: &str) -> Option<RouteMatch<'_>> {
		self.0.iter().find_map(|route| {
			let params = route.matches(method, path)?;
			let operation = route.kind.bind(&params)?;

			Some(RouteMatch { route, operation })
		})
	}

	/// Index pairs `(earlier, later)` of routes that could match the same request.
	pub fn conflicts(&self) -> Vec<(usize, usize)> {
		let mut out = Vec::new();

		for (i, earlier) in self.0.iter().enumerate() {
			for (j, later) in self.0.iter().enumerate().skip(i + 1) {
				if earlier.overlaps(later) {
					out.push((i, j));
				}
			}
		}

		out
	}
}
impl Default for RouteTable {
	fn default() -> Self {
		Self::standard()
	}
}
