use std::any::Any;

use gantry_types::Route;

use crate::template::RequestTemplate;

/// A value crossing one of the heterogeneously-typed seams of the tree (a
/// scoped sub-program's result, a concurrent branch's result). Erased by
/// the constructor that created the seam and reclaimed by the continuation
/// it installed alongside; nothing else ever touches one.
type Erased = Box<dyn Any + Send>;

type Continue<A, T> = Box<dyn FnOnce(A) -> Program<T> + Send>;

pub(crate) enum Step<T> {
    Pure(T),
    Abort,
    Fetch(Route, Continue<Vec<u8>, T>),
    Submit(Route, Vec<u8>, Continue<Vec<u8>, T>),
    Effect(Box<dyn FnOnce() -> Program<T> + Send>),
    Scoped {
        modify: Box<dyn FnOnce(&mut RequestTemplate) + Send>,
        inner: Box<Program<Erased>>,
        next: Continue<Erased, T>,
    },
    Concurrent {
        left: Box<Program<Erased>>,
        right: Box<Program<Erased>>,
        join: Box<dyn FnOnce(Erased, Erased) -> Program<T> + Send>,
    },
}

/// An assembled, not-yet-executed description of calls against the
/// orchestration server.
///
/// Programs are immutable operation trees: building one performs no IO, and
/// a program is consumed exactly once by [`run`](crate::run) or
/// [`run_or_fail`](crate::run_or_fail). Sequencing is explicit —
/// [`Program::and_then`] feeds one step's value into the function producing
/// the next — and the primitives ([`fetch`], [`submit`], [`concurrent`],
/// [`scoped`], [`Program::effect`], [`Program::abort`]) are the only
/// leaves.
pub struct Program<T>(pub(crate) Step<T>);

impl<T: Send + 'static> Program<T> {
    /// A program that immediately completes with `value`, touching nothing.
    #[must_use]
    pub fn pure(value: T) -> Self {
        Program(Step::Pure(value))
    }

    /// Unconditional short-circuit: interpreting this terminates the whole
    /// enclosing run with
    /// [`Outcome::Disconnected`](gantry_types::Outcome::Disconnected), no
    /// matter how deeply it is nested.
    #[must_use]
    pub fn abort() -> Self {
        Program(Step::Abort)
    }

    /// Lift a host-side side-effecting computation into the program. The
    /// closure runs synchronously when interpretation reaches this point;
    /// anything it panics with propagates to the caller untouched.
    #[must_use]
    pub fn effect<F>(f: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Program(Step::Effect(Box::new(move || Program::pure(f()))))
    }

    /// Run `self`, then feed its value into `f` to produce the rest of the
    /// program.
    #[must_use]
    pub fn and_then<U, F>(self, f: F) -> Program<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Program<U> + Send + 'static,
    {
        match self.0 {
            Step::Pure(value) => f(value),
            Step::Abort => Program(Step::Abort),
            Step::Fetch(route, next) => Program(Step::Fetch(
                route,
                Box::new(move |body| next(body).and_then(f)),
            )),
            Step::Submit(route, payload, next) => Program(Step::Submit(
                route,
                payload,
                Box::new(move |body| next(body).and_then(f)),
            )),
            Step::Effect(effect) => Program(Step::Effect(Box::new(move || effect().and_then(f)))),
            Step::Scoped {
                modify,
                inner,
                next,
            } => Program(Step::Scoped {
                modify,
                inner,
                next: Box::new(move |value| next(value).and_then(f)),
            }),
            Step::Concurrent { left, right, join } => Program(Step::Concurrent {
                left,
                right,
                join: Box::new(move |a, b| join(a, b).and_then(f)),
            }),
        }
    }

    #[must_use]
    pub fn map<U, F>(self, f: F) -> Program<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.and_then(move |value| Program::pure(f(value)))
    }

    /// Collect the values of `programs`, run one after another, left to
    /// right.
    #[must_use]
    pub fn all(programs: Vec<Program<T>>) -> Program<Vec<T>> {
        programs
            .into_iter()
            .fold(Program::pure(Vec::new()), |acc, program| {
                acc.and_then(move |mut values| {
                    program.map(move |value| {
                        values.push(value);
                        values
                    })
                })
            })
    }

    /// Collect the values of `programs`, run concurrently via a pairwise
    /// fold over [`concurrent`]. The collected order follows the input
    /// order regardless of which branch finishes first.
    #[must_use]
    pub fn concurrent_all(programs: Vec<Program<T>>) -> Program<Vec<T>> {
        programs
            .into_iter()
            .fold(Program::pure(Vec::new()), |acc, program| {
                concurrent(acc, program, |mut values, value| {
                    values.push(value);
                    values
                })
            })
    }
}

/// Describe a read of the resource at `route`. Nothing is issued until the
/// program is run; interpretation GETs the route under the ambient template
/// and continues with the raw response body.
///
/// Routes must be complete. One with an open placeholder does not
/// type-check here:
///
/// ```compile_fail
/// use gantry_types::Route;
///
/// let open = Route::root().join("job").slot();
/// gantry_client::fetch(open);
/// ```
#[must_use]
pub fn fetch(route: impl Into<Route>) -> Program<Vec<u8>> {
    Program(Step::Fetch(route.into(), Box::new(Program::pure)))
}

/// Describe a write of `body` to the resource at `route`. Interpretation
/// POSTs with redirect-following disabled, accepts any status in
/// [200, 400), and continues with the raw response body.
#[must_use]
pub fn submit(route: impl Into<Route>, body: impl Into<Vec<u8>>) -> Program<Vec<u8>> {
    Program(Step::Submit(route.into(), body.into(), Box::new(Program::pure)))
}

/// Describe running `left` and `right` in parallel, each against its own
/// copy of the ambient template, then merging their values with `join`.
///
/// Both branches run to completion before the merge; neither can observe
/// the other. An abort in either branch disconnects the whole run, and a
/// transport failure in either branch fails it.
#[must_use]
pub fn concurrent<A, B, C, F>(left: Program<A>, right: Program<B>, join: F) -> Program<C>
where
    A: Send + 'static,
    B: Send + 'static,
    C: Send + 'static,
    F: FnOnce(A, B) -> C + Send + 'static,
{
    Program(Step::Concurrent {
        left: Box::new(left.map(erase)),
        right: Box::new(right.map(erase)),
        join: Box::new(move |a, b| Program::pure(join(reclaim::<A>(a), reclaim::<B>(b)))),
    })
}

/// Describe running `inner` under a template modified by `modify`. The
/// modification is visible only inside `inner`; whatever follows the scope
/// resumes against the unmodified ambient template.
#[must_use]
pub fn scoped<A, F>(modify: F, inner: Program<A>) -> Program<A>
where
    A: Send + 'static,
    F: FnOnce(&mut RequestTemplate) + Send + 'static,
{
    Program(Step::Scoped {
        modify: Box::new(modify),
        inner: Box::new(inner.map(erase)),
        next: Box::new(|value| Program::pure(reclaim::<A>(value))),
    })
}

fn erase<T: Send + 'static>(value: T) -> Erased {
    Box::new(value)
}

fn reclaim<T: 'static>(boxed: Erased) -> T {
    match boxed.downcast::<T>() {
        Ok(value) => *value,
        Err(_) => unreachable!("an erased value is reclaimed only by the continuation that erased it"),
    }
}
