use std::fmt;
use std::marker::PhantomData;

/// Marker for a route whose segments are all concrete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Complete;

/// Marker for a route with one open placeholder segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partial;

/// A hierarchical address on the orchestration server: path segments plus
/// optional query parameters.
///
/// Whether a route is usable in a call is tracked in the type. A
/// `Route<Complete>` has only concrete segments and can be fetched or
/// submitted to; [`Route::slot`] opens a placeholder and moves the route to
/// `Route<Partial>`, which composes like any other route ([`Route::join`],
/// [`Route::query`]) but is rejected by the call constructors until
/// [`Route::fill`] closes the placeholder. Query parameters never affect
/// completeness.
///
/// ```
/// use gantry_types::Route;
///
/// let build = Route::root()
///     .join("job")
///     .slot()
///     .join("build")
///     .query("delay", "0sec")
///     .fill("nightly-deploy");
/// assert_eq!(build.to_string(), "job/nightly-deploy/build?delay=0sec");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route<State = Complete> {
    segments: Vec<String>,
    /// Insertion point of the one open placeholder, when `State` is
    /// [`Partial`].
    hole: Option<usize>,
    query: Vec<(String, String)>,
    _state: PhantomData<State>,
}

impl Route<Complete> {
    /// The server root.
    #[must_use]
    pub fn root() -> Self {
        Route {
            segments: Vec::new(),
            hole: None,
            query: Vec::new(),
            _state: PhantomData,
        }
    }

    /// Open a placeholder segment at the current position.
    ///
    /// Only one placeholder can be open at a time; it must be closed with
    /// [`Route::fill`] before another can be opened:
    ///
    /// ```compile_fail
    /// use gantry_types::Route;
    ///
    /// let _ = Route::root().slot().slot();
    /// ```
    #[must_use]
    pub fn slot(self) -> Route<Partial> {
        let hole = Some(self.segments.len());
        Route {
            segments: self.segments,
            hole,
            query: self.query,
            _state: PhantomData,
        }
    }

    /// The concrete path segments, in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    pub fn query_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.query
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl Route<Partial> {
    /// Close the open placeholder with a concrete value.
    ///
    /// The value lands as a single segment, exactly where the placeholder
    /// was opened.
    #[must_use]
    pub fn fill(mut self, value: impl fmt::Display) -> Route<Complete> {
        if let Some(at) = self.hole.take() {
            self.segments.insert(at, value.to_string());
        }
        Route {
            segments: self.segments,
            hole: None,
            query: self.query,
            _state: PhantomData,
        }
    }
}

impl<State> Route<State> {
    /// Append path segments. Slashes split into separate segments and empty
    /// segments are dropped, so joins never produce doubled slashes.
    #[must_use]
    pub fn join(mut self, path: impl AsRef<str>) -> Self {
        self.segments.extend(
            path.as_ref()
                .split('/')
                .filter(|piece| !piece.is_empty())
                .map(str::to_owned),
        );
        self
    }

    /// Append one query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

impl From<&str> for Route<Complete> {
    fn from(path: &str) -> Self {
        Route::root().join(path)
    }
}

impl From<String> for Route<Complete> {
    fn from(path: String) -> Self {
        Route::root().join(path)
    }
}

impl<State> fmt::Display for Route<State> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<&str> = self.segments.iter().map(String::as_str).collect();
        if let Some(at) = self.hole {
            parts.insert(at, "{}");
        }
        f.write_str(&parts.join("/"))?;
        for (index, (key, value)) in self.query.iter().enumerate() {
            let lead = if index == 0 { '?' } else { '&' };
            write!(f, "{lead}{key}={value}")?;
        }
        Ok(())
    }
}
