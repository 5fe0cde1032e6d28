//! Agent factory.
//!
//! Builds agent instances from templates resolved through the
//! [`TemplateRegistry`], and keeps four pieces of bookkeeping per live agent:
//! the instance itself, its metadata snapshot, its timestamps and its
//! execution metrics. All four are inserted and removed together.

use crate::agent::{
    domain::{AgentId, AgentInstanceRecord, AgentMetadata, AgentMetrics, AgentSpec, AgentStatus},
    ports::FrameworkFactory,
};
use crate::error::ErrorKind;
use crate::template::{
    domain::{FrameworkTag, TemplateDescriptor},
    ports::{AgentInstance, TemplateError},
    services::TemplateRegistry,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Service-level errors for agent factory operations.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// No live agent has the given identifier.
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    /// The requested template or version is not registered.
    #[error(
        "template '{template_id}' version {} not found; available templates: [{}]",
        .version.as_deref().unwrap_or("latest"),
        .available.join(", ")
    )]
    TemplateNotFound {
        /// Requested template identifier.
        template_id: String,
        /// Requested version, `None` for latest.
        version: Option<String>,
        /// Registered template identifiers.
        available: Vec<String>,
    },

    /// The agent identifier is live or being constructed.
    #[error("agent {0} already exists")]
    Conflict(AgentId),

    /// The template rejected the configuration.
    #[error("invalid configuration for agent {agent_id}: {}", .errors.join("; "))]
    Validation {
        /// Agent being created.
        agent_id: AgentId,
        /// Errors reported by the template.
        errors: Vec<String>,
    },

    /// Building the instance failed.
    #[error("failed to construct agent {agent_id}: {source}")]
    Construction {
        /// Agent being created.
        agent_id: AgentId,
        /// Error reported by the template or framework factory.
        source: TemplateError,
    },

    /// Running the instance failed.
    #[error("agent {agent_id} failed to execute: {source}")]
    Execution {
        /// Agent that was executed.
        agent_id: AgentId,
        /// Error reported by the instance.
        source: TemplateError,
    },
}

impl FactoryError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AgentNotFound(_) | Self::TemplateNotFound { .. } => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Construction { .. } | Self::Execution { .. } => ErrorKind::Internal,
        }
    }
}

/// Result type for factory operations.
pub type FactoryResult<T> = Result<T, FactoryError>;

/// Aggregate statistics across live agents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactoryStats {
    /// Number of live agents.
    pub total_agents: usize,
    /// Executions across all live agents.
    pub total_executions: u64,
    /// Mean execution time, `None` before the first execution.
    pub average_response_time: Option<Duration>,
    /// Failed executions divided by executions, between 0 and 1.
    pub error_rate: f64,
    /// Live agents per framework tag.
    pub framework_distribution: BTreeMap<String, usize>,
    /// Framework tags with a registered framework factory, sorted.
    pub active_frameworks: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
struct Timestamps {
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
}

/// Holds an agent id in `pending` until dropped, including on panic.
struct Reservation<'a> {
    state: &'a Mutex<FactoryState>,
    agent_id: AgentId,
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .remove(&self.agent_id);
    }
}

#[derive(Default)]
struct FactoryState {
    instances: HashMap<AgentId, Arc<dyn AgentInstance>>,
    metadata: HashMap<AgentId, AgentMetadata>,
    timestamps: HashMap<AgentId, Timestamps>,
    metrics: HashMap<AgentId, AgentMetrics>,
    pending: HashSet<AgentId>,
}

impl FactoryState {
    fn record(&self, agent_id: &AgentId) -> Option<AgentInstanceRecord> {
        let metadata = self.metadata.get(agent_id)?;
        let timestamps = self.timestamps.get(agent_id)?;
        Some(AgentInstanceRecord {
            agent_id: agent_id.clone(),
            metadata: metadata.clone(),
            created_at: timestamps.created_at,
            status: AgentStatus::Active,
            last_activity: timestamps.last_activity,
            metrics: self.metrics.get(agent_id).copied().unwrap_or_default(),
        })
    }

    fn remove(&mut self, agent_id: &AgentId) -> Option<Arc<dyn AgentInstance>> {
        self.metadata.remove(agent_id);
        self.timestamps.remove(agent_id);
        self.metrics.remove(agent_id);
        self.instances.remove(agent_id)
    }
}

/// Creates, tracks and destroys agent instances.
pub struct AgentFactory<C>
where
    C: Clock + Send + Sync,
{
    registry: Arc<TemplateRegistry>,
    clock: Arc<C>,
    framework_factories: RwLock<HashMap<FrameworkTag, Arc<dyn FrameworkFactory>>>,
    state: Mutex<FactoryState>,
}

impl<C> AgentFactory<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a factory resolving templates through `registry`.
    #[must_use]
    pub fn new(registry: Arc<TemplateRegistry>, clock: Arc<C>) -> Self {
        Self {
            registry,
            clock,
            framework_factories: RwLock::new(HashMap::new()),
            state: Mutex::new(FactoryState::default()),
        }
    }

    /// Returns the template registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<TemplateRegistry> {
        &self.registry
    }

    fn lock_state(&self) -> MutexGuard<'_, FactoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates an agent from its spec.
    ///
    /// The agent id is reserved before construction starts, so concurrent
    /// calls with the same id cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::Conflict`] when the id is live or reserved,
    /// [`FactoryError::TemplateNotFound`] when the template or version is not
    /// registered, [`FactoryError::Validation`] when the template rejects the
    /// configuration, or [`FactoryError::Construction`] when building fails.
    pub async fn create_agent(&self, spec: AgentSpec) -> FactoryResult<AgentInstanceRecord> {
        let agent_id = spec.agent_id().clone();
        let _reservation = self.reserve(&agent_id)?;

        match self.build(&spec).await {
            Ok((instance, metadata)) => Ok(self.commit(agent_id, instance, metadata)),
            Err(err) => {
                warn!(agent_id = %agent_id, error = %err, "agent creation failed");
                Err(err)
            }
        }
    }

    fn reserve(&self, agent_id: &AgentId) -> FactoryResult<Reservation<'_>> {
        let mut state = self.lock_state();
        if state.instances.contains_key(agent_id) || !state.pending.insert(agent_id.clone()) {
            return Err(FactoryError::Conflict(agent_id.clone()));
        }
        Ok(Reservation {
            state: &self.state,
            agent_id: agent_id.clone(),
        })
    }

    async fn build(
        &self,
        spec: &AgentSpec,
    ) -> FactoryResult<(Box<dyn AgentInstance>, AgentMetadata)> {
        let agent_id = spec.agent_id();
        let descriptor = self.resolve_template(spec)?;
        let template = descriptor.capability_handle().template();

        let validation = template.validate_config(spec.config());
        for warning in &validation.warnings {
            warn!(agent_id = %agent_id, warning = %warning, "configuration warning");
        }
        if !validation.is_valid() {
            return Err(FactoryError::Validation {
                agent_id: agent_id.clone(),
                errors: validation.errors,
            });
        }

        let framework_factory = self
            .framework_factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(descriptor.framework_tag())
            .cloned();
        let built = match framework_factory {
            Some(factory) => {
                debug!(
                    agent_id = %agent_id,
                    framework = %descriptor.framework_tag(),
                    "delegating construction to framework factory"
                );
                factory.create_instance(&descriptor, spec).await
            }
            None => template.create_instance(spec).await,
        };
        let instance = built.map_err(|source| FactoryError::Construction {
            agent_id: agent_id.clone(),
            source,
        })?;

        let metadata = AgentMetadata {
            template_id: descriptor.template_id().clone(),
            template_version: descriptor.version().to_owned(),
            framework_tag: descriptor.framework_tag().clone(),
            name: spec.name().map(str::to_owned),
            config: spec.config().clone(),
        };
        Ok((instance, metadata))
    }

    fn resolve_template(&self, spec: &AgentSpec) -> FactoryResult<TemplateDescriptor> {
        self.registry
            .get(spec.template_id(), spec.template_version())
            .ok_or_else(|| FactoryError::TemplateNotFound {
                template_id: spec.template_id().to_owned(),
                version: spec.template_version().map(str::to_owned),
                available: self.registry.template_ids(),
            })
    }

    fn commit(
        &self,
        agent_id: AgentId,
        instance: Box<dyn AgentInstance>,
        metadata: AgentMetadata,
    ) -> AgentInstanceRecord {
        let now = self.clock.utc();
        let record = AgentInstanceRecord {
            agent_id: agent_id.clone(),
            metadata: metadata.clone(),
            created_at: now,
            status: AgentStatus::Active,
            last_activity: now,
            metrics: AgentMetrics::new(),
        };

        let mut state = self.lock_state();
        state.instances.insert(agent_id.clone(), Arc::from(instance));
        state.metadata.insert(agent_id.clone(), metadata);
        state.timestamps.insert(
            agent_id.clone(),
            Timestamps {
                created_at: now,
                last_activity: now,
            },
        );
        state.metrics.insert(agent_id.clone(), AgentMetrics::new());
        drop(state);

        info!(
            agent_id = %agent_id,
            template_id = %record.metadata.template_id,
            version = %record.metadata.template_version,
            "agent created"
        );
        record
    }

    /// Destroys an agent.
    ///
    /// Bookkeeping is removed first; the instance's cleanup hook then runs
    /// and its failure is only logged. Returns `false` when the agent is not
    /// live.
    pub async fn destroy_agent(&self, agent_id: &AgentId) -> bool {
        let removed = self.lock_state().remove(agent_id);
        let Some(instance) = removed else {
            debug!(agent_id = %agent_id, "destroy requested for unknown agent");
            return false;
        };

        if let Err(err) = instance.cleanup().await {
            warn!(agent_id = %agent_id, error = %err, "agent cleanup failed");
        }
        info!(agent_id = %agent_id, "agent destroyed");
        true
    }

    /// Rebuilds an agent from a new spec under the same id.
    ///
    /// Cumulative metrics carry over to the new instance. If the rebuild
    /// fails the old instance is already gone.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::AgentNotFound`] when the agent is not live, or
    /// any error from [`Self::create_agent`].
    pub async fn update_agent(
        &self,
        agent_id: &AgentId,
        spec: AgentSpec,
    ) -> FactoryResult<AgentInstanceRecord> {
        let previous = self
            .get_agent_metrics(agent_id)
            .ok_or_else(|| FactoryError::AgentNotFound(agent_id.clone()))?;

        self.destroy_agent(agent_id).await;
        let mut record = self
            .create_agent(spec.with_agent_id(agent_id.clone()))
            .await?;

        let mut state = self.lock_state();
        if let Some(metrics) = state.metrics.get_mut(agent_id) {
            *metrics = previous;
            record.metrics = previous;
        }
        drop(state);

        info!(agent_id = %agent_id, "agent updated");
        Ok(record)
    }

    /// Runs an agent on one input and records the outcome in its metrics.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::AgentNotFound`] when the agent is not live, or
    /// [`FactoryError::Execution`] when the instance fails.
    pub async fn execute_agent(&self, agent_id: &AgentId, input: Value) -> FactoryResult<Value> {
        let instance = self
            .lock_state()
            .instances
            .get(agent_id)
            .cloned()
            .ok_or_else(|| FactoryError::AgentNotFound(agent_id.clone()))?;

        let started = Instant::now();
        let outcome = instance.execute(input).await;
        let elapsed = started.elapsed();

        let now = self.clock.utc();
        let mut state = self.lock_state();
        if let Some(metrics) = state.metrics.get_mut(agent_id) {
            metrics.record(elapsed, outcome.is_ok());
        }
        if let Some(timestamps) = state.timestamps.get_mut(agent_id) {
            timestamps.last_activity = now;
        }
        drop(state);

        outcome.map_err(|source| FactoryError::Execution {
            agent_id: agent_id.clone(),
            source,
        })
    }

    /// Routes construction for `tag` through `factory`.
    ///
    /// Returns the factory previously registered for the tag, if any.
    pub fn register_framework_factory(
        &self,
        tag: FrameworkTag,
        factory: Arc<dyn FrameworkFactory>,
    ) -> Option<Arc<dyn FrameworkFactory>> {
        info!(framework = %tag, "framework factory registered");
        self.framework_factories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(tag, factory)
    }

    /// Removes the framework factory for `tag`.
    pub fn unregister_framework_factory(&self, tag: &FrameworkTag) -> bool {
        self.framework_factories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(tag)
            .is_some()
    }

    /// Returns whether an agent is live.
    #[must_use]
    pub fn contains(&self, agent_id: &AgentId) -> bool {
        self.lock_state().instances.contains_key(agent_id)
    }

    /// Returns the record of a live agent.
    #[must_use]
    pub fn get_agent(&self, agent_id: &AgentId) -> Option<AgentInstanceRecord> {
        self.lock_state().record(agent_id)
    }

    /// Returns records of every live agent, oldest first.
    #[must_use]
    pub fn list_agents(&self) -> Vec<AgentInstanceRecord> {
        let state = self.lock_state();
        let mut records: Vec<AgentInstanceRecord> = state
            .instances
            .keys()
            .filter_map(|agent_id| state.record(agent_id))
            .collect();
        drop(state);
        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.agent_id.cmp(&b.agent_id))
        });
        records
    }

    /// Returns the metadata snapshot of a live agent.
    #[must_use]
    pub fn get_agent_metadata(&self, agent_id: &AgentId) -> Option<AgentMetadata> {
        self.lock_state().metadata.get(agent_id).cloned()
    }

    /// Returns the metrics of a live agent.
    #[must_use]
    pub fn get_agent_metrics(&self, agent_id: &AgentId) -> Option<AgentMetrics> {
        self.lock_state().metrics.get(agent_id).copied()
    }

    /// Returns the number of live agents.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.lock_state().instances.len()
    }

    /// Computes aggregate statistics.
    #[must_use]
    pub fn get_stats(&self) -> FactoryStats {
        let (total_agents, executions, errors, total_time, framework_distribution) = {
            let state = self.lock_state();
            let mut framework_distribution = BTreeMap::new();
            for metadata in state.metadata.values() {
                *framework_distribution
                    .entry(metadata.framework_tag.as_str().to_owned())
                    .or_insert(0_usize) += 1;
            }
            let (executions, errors, total_time) = state.metrics.values().fold(
                (0_u64, 0_u64, Duration::ZERO),
                |(executions, errors, total), metrics| {
                    (
                        executions.saturating_add(metrics.executions()),
                        errors.saturating_add(metrics.error_count()),
                        total.saturating_add(metrics.total_time()),
                    )
                },
            );
            (
                state.instances.len(),
                executions,
                errors,
                total_time,
                framework_distribution,
            )
        };

        let mut active_frameworks: Vec<String> = self
            .framework_factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .map(|tag| tag.as_str().to_owned())
            .collect();
        active_frameworks.sort();

        FactoryStats {
            total_agents,
            total_executions: executions,
            average_response_time: crate::agent::domain::average(total_time, executions),
            error_rate: ratio(errors, executions),
            framework_distribution,
            active_frameworks,
        }
    }
}

#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "error rate is an approximate ratio"
)]
fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}
