use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tracing::debug;

use crate::error::TransportError;
use crate::exec::Connection;
use crate::program::{Program, Step};
use crate::template::RequestTemplate;

/// How one interpretation finished, short of a transport failure.
pub(crate) enum Flow<T> {
    Value(T),
    Aborted,
}

/// Walk a program against a live connection.
///
/// Sequential composition iterates in place, so arbitrarily long chains
/// never grow the stack; only nesting — a scope's inner program, the two
/// branches of the concurrency combinator — re-enters through a boxed
/// future. The template is owned by this walk and cloned exactly where the
/// tree forks: into a scope (modified copy, original resumes afterwards)
/// and into each concurrent branch.
///
/// An abort anywhere unwinds to the nearest enclosing interpretation as
/// [`Flow::Aborted`] and from there all the way out: every join point
/// checks for it before continuing. Transport failures travel on the error
/// channel and stop the walk the same way.
pub(crate) fn interpret<T>(
    connection: &Connection,
    template: RequestTemplate,
    program: Program<T>,
) -> BoxFuture<'_, Result<Flow<T>, TransportError>>
where
    T: Send + 'static,
{
    async move {
        let mut program = program;
        loop {
            match program.0 {
                Step::Pure(value) => return Ok(Flow::Value(value)),
                Step::Abort => {
                    debug!("program disconnected");
                    return Ok(Flow::Aborted);
                }
                Step::Fetch(route, next) => {
                    let body = connection.fetch(&template, &route).await?;
                    program = next(body);
                }
                Step::Submit(route, payload, next) => {
                    let body = connection.submit(&template, &route, payload).await?;
                    program = next(body);
                }
                Step::Effect(effect) => program = effect(),
                Step::Scoped {
                    modify,
                    inner,
                    next,
                } => {
                    let mut scoped = template.clone();
                    modify(&mut scoped);
                    match interpret(connection, scoped, *inner).await? {
                        Flow::Value(value) => program = next(value),
                        Flow::Aborted => return Ok(Flow::Aborted),
                    }
                }
                Step::Concurrent { left, right, join } => {
                    let (first, second) = tokio::join!(
                        interpret(connection, template.clone(), *left),
                        interpret(connection, template.clone(), *right),
                    );
                    match (first?, second?) {
                        (Flow::Value(a), Flow::Value(b)) => program = join(a, b),
                        _ => return Ok(Flow::Aborted),
                    }
                }
            }
        }
    }
    .boxed()
}
