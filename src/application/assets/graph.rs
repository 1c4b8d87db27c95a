use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::{join_all, BoxFuture, FutureExt};

use crate::application::services::progress::{run_step, StepObserver, StepOutcome};
use crate::common::{SwagError, SwagResult};

type TaskFn<C> = Arc<dyn Fn(Arc<C>) -> BoxFuture<'static, SwagResult<()>> + Send + Sync>;

/// What a task does when it runs
pub enum TaskNode<C> {
    /// A leaf doing actual work
    Action(TaskFn<C>),
    /// Children run one after another; the first failure stops the chain
    Series(Vec<String>),
    /// Children run concurrently; every child finishes before a failure is reported
    Parallel(Vec<String>),
}

struct TaskDefinition<C> {
    description: String,
    node: TaskNode<C>,
}

/// Named tasks over a shared context `C`, composable in series and in parallel
pub struct TaskGraph<C> {
    tasks: BTreeMap<String, TaskDefinition<C>>,
}

impl<C> Default for TaskGraph<C> {
    fn default() -> Self {
        Self {
            tasks: BTreeMap::new(),
        }
    }
}

impl<C: Send + Sync + 'static> TaskGraph<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a leaf task
    pub fn action<F, Fut>(&mut self, name: &str, description: &str, task: F) -> &mut Self
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = SwagResult<()>> + Send + 'static,
    {
        let task: TaskFn<C> = Arc::new(move |ctx| task(ctx).boxed());
        self.insert(name, description, TaskNode::Action(task))
    }

    pub fn series(&mut self, name: &str, description: &str, children: &[&str]) -> &mut Self {
        let children = children.iter().map(|c| c.to_string()).collect();
        self.insert(name, description, TaskNode::Series(children))
    }

    pub fn parallel(&mut self, name: &str, description: &str, children: &[&str]) -> &mut Self {
        let children = children.iter().map(|c| c.to_string()).collect();
        self.insert(name, description, TaskNode::Parallel(children))
    }

    fn insert(&mut self, name: &str, description: &str, node: TaskNode<C>) -> &mut Self {
        self.tasks.insert(
            name.to_string(),
            TaskDefinition {
                description: description.to_string(),
                node,
            },
        );
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Task names with their descriptions, sorted by name
    pub fn list(&self) -> Vec<(&str, &str)> {
        self.tasks
            .iter()
            .map(|(name, def)| (name.as_str(), def.description.as_str()))
            .collect()
    }

    /// Check that every composite only refers to registered tasks
    pub fn validate(&self) -> SwagResult<()> {
        for def in self.tasks.values() {
            if let TaskNode::Series(children) | TaskNode::Parallel(children) = &def.node {
                if let Some(missing) = children.iter().find(|c| !self.contains(c)) {
                    return Err(SwagError::unknown_task(missing.as_str()));
                }
            }
        }
        Ok(())
    }

    /// Run `name` and everything it is composed of
    ///
    /// Each action is reported to `observer` as one step.
    pub fn run<'a>(
        &'a self,
        name: &'a str,
        ctx: Arc<C>,
        observer: &'a dyn StepObserver,
    ) -> BoxFuture<'a, SwagResult<()>> {
        async move {
            let def = self
                .tasks
                .get(name)
                .ok_or_else(|| SwagError::unknown_task(name))?;

            match &def.node {
                TaskNode::Action(task) => {
                    tracing::info!(task = name, "starting task");
                    run_step(observer, name, async {
                        task(ctx).await?;
                        Ok(StepOutcome::Done)
                    })
                    .await?;
                    tracing::info!(task = name, "finished task");
                }
                TaskNode::Series(children) => {
                    for child in children {
                        self.run(child, ctx.clone(), observer).await?;
                    }
                }
                TaskNode::Parallel(children) => {
                    let results = join_all(
                        children
                            .iter()
                            .map(|child| self.run(child, ctx.clone(), observer)),
                    )
                    .await;
                    results.into_iter().collect::<SwagResult<Vec<()>>>()?;
                }
            }
            Ok(())
        }
        .boxed()
    }
}
