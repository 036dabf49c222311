//! The game session controller.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeSet,
    future::Future,
    rc::Rc,
};

use longhand_core::{Answer, AnswerSet, Correctness, FieldId, GameMode, Problem};
use longhand_generator::{GenerateError, Level, LevelCatalog, LevelId, ProblemGenerator};
use serde::{Deserialize, Serialize};

use crate::{
    config::SessionConfig,
    navigation::NavContext,
    source::{FetchError, ProblemSource},
    task::TaskQueue,
    validate,
};

/// Errors kept in the [`LoadStatus`] side channel after a level load.
///
/// None of these interrupt the game: a failed fetch still produces a locally
/// generated batch.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum LoadError {
    /// The external source failed and the batch was generated locally.
    #[display("Failed to load problems. Please try again.")]
    Fetch {
        /// The source's error.
        source: FetchError,
    },
    /// The requested level is not part of the catalog.
    #[display("Level {level} does not exist.")]
    UnknownLevel {
        /// The requested level.
        level: LevelId,
    },
    /// Local generation failed; the previous batch was kept.
    #[display("Failed to generate problems: {source}")]
    Generate {
        /// The generator's error.
        source: GenerateError,
    },
}

/// Progress of level loading, kept apart from the session state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStatus {
    /// True while a level load is in flight.
    pub is_loading: bool,
    /// The most recent recoverable error, cleared when the next load starts.
    pub error: Option<LoadError>,
}

/// A point-in-time view of a game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    mode: GameMode,
    current_level: LevelId,
    completed_levels: BTreeSet<LevelId>,
    available_levels: BTreeSet<LevelId>,
    current_problem_index: usize,
    level_problems: Vec<Problem>,
    problem: Option<Problem>,
    answers: AnswerSet,
    is_submitted: bool,
    is_complete: bool,
    score: u32,
    /// Set once the current problem has paid out; cleared on every problem change.
    awarded: bool,
}

impl SessionState {
    fn new(mode: GameMode) -> Self {
        Self {
            mode,
            current_level: LevelId::FIRST,
            completed_levels: BTreeSet::new(),
            available_levels: BTreeSet::from([LevelId::FIRST]),
            current_problem_index: 0,
            level_problems: Vec::new(),
            problem: None,
            answers: AnswerSet::new(),
            is_submitted: false,
            is_complete: false,
            score: 0,
            awarded: false,
        }
    }

    /// Returns the game mode of the session.
    #[must_use]
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Returns the level being played.
    #[must_use]
    pub fn current_level(&self) -> LevelId {
        self.current_level
    }

    /// Returns the levels with at least one completed problem.
    #[must_use]
    pub fn completed_levels(&self) -> &BTreeSet<LevelId> {
        &self.completed_levels
    }

    /// Returns the unlocked levels; always contains level 1.
    #[must_use]
    pub fn available_levels(&self) -> &BTreeSet<LevelId> {
        &self.available_levels
    }

    /// Returns the index of the current problem within the level batch.
    #[must_use]
    pub fn current_problem_index(&self) -> usize {
        self.current_problem_index
    }

    /// Returns the problems loaded for the current level.
    #[must_use]
    pub fn level_problems(&self) -> &[Problem] {
        &self.level_problems
    }

    /// Returns the problem being worked on.
    #[must_use]
    pub fn problem(&self) -> Option<&Problem> {
        self.problem.as_ref()
    }

    /// Returns the answers entered for the current problem.
    #[must_use]
    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    /// Returns true once the current problem has been submitted.
    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.is_submitted
    }

    /// Returns true if the last submission completed the problem.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    /// Returns the total score.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Returns the view of this state the field navigator needs.
    #[must_use]
    pub fn nav_context(&self) -> NavContext<'_> {
        NavContext {
            problem: self.problem.as_ref(),
            answers: &self.answers,
            is_submitted: self.is_submitted,
        }
    }

    fn reset_problem_scope(&mut self) {
        self.answers.clear();
        self.is_submitted = false;
        self.is_complete = false;
        self.awarded = false;
    }

    fn install_problem(&mut self, problem: Option<Problem>) {
        self.problem = problem;
        self.reset_problem_scope();
    }

    fn install_batch(&mut self, problems: Vec<Problem>) {
        self.current_problem_index = 0;
        let first = problems.first().cloned();
        self.level_problems = problems;
        self.install_problem(first);
    }

    /// Records an answer change; after a submission the change waits for the next one.
    fn mark_answers_changed(&mut self) {
        if self.is_submitted {
            self.is_complete = false;
        }
    }
}

/// Builder for [`GameSession`].
pub struct SessionBuilder {
    catalog: LevelCatalog,
    config: SessionConfig,
    generator: Option<ProblemGenerator>,
    source: Option<Rc<dyn ProblemSource>>,
}

impl std::fmt::Debug for SessionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBuilder")
            .field("catalog", &self.catalog)
            .field("config", &self.config)
            .field("has_source", &self.source.is_some())
            .finish_non_exhaustive()
    }
}

impl SessionBuilder {
    /// Sets the session configuration.
    #[must_use]
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses `generator` for local problems.
    #[must_use]
    pub fn generator(mut self, generator: ProblemGenerator) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Uses a generator seeded with `seed` for local problems and shuffling.
    #[must_use]
    pub fn seed(self, seed: u64) -> Self {
        self.generator(ProblemGenerator::with_seed(seed))
    }

    /// Sets the external problem source.
    #[must_use]
    pub fn source(mut self, source: impl ProblemSource + 'static) -> Self {
        self.source = Some(Rc::new(source));
        self
    }

    /// Builds the session.
    #[must_use]
    pub fn build(self) -> GameSession {
        let state = SessionState::new(self.catalog.mode());
        GameSession {
            inner: Rc::new(SessionInner {
                catalog: self.catalog,
                config: self.config,
                source: self.source,
                generator: RefCell::new(self.generator.unwrap_or_default()),
                state: RefCell::new(state),
                status: RefCell::new(LoadStatus::default()),
                latest_load: Cell::new(0),
                tasks: TaskQueue::new(),
            }),
        }
    }
}

/// Controls the lifecycle of levels, problems, answers, and scoring.
///
/// A `GameSession` is a cheap handle: clones share the same session record. All
/// operations are synchronous state transitions except level loading, which runs as
/// a local future driven by [`GameSession::run_pending`] on the caller's event loop.
#[derive(Debug, Clone)]
pub struct GameSession {
    inner: Rc<SessionInner>,
}

struct SessionInner {
    catalog: LevelCatalog,
    config: SessionConfig,
    source: Option<Rc<dyn ProblemSource>>,
    generator: RefCell<ProblemGenerator>,
    state: RefCell<SessionState>,
    status: RefCell<LoadStatus>,
    /// Token of the most recent load; results of older loads are discarded.
    latest_load: Cell<u64>,
    tasks: TaskQueue,
}

impl std::fmt::Debug for SessionInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionInner")
            .field("catalog", &self.catalog)
            .field("config", &self.config)
            .field("state", &self.state)
            .field("status", &self.status)
            .field("tasks", &self.tasks)
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// Starts building a session over the levels of `catalog`.
    #[must_use]
    pub fn builder(catalog: LevelCatalog) -> SessionBuilder {
        SessionBuilder {
            catalog,
            config: SessionConfig::default(),
            generator: None,
            source: None,
        }
    }

    /// Returns the level catalog.
    #[must_use]
    pub fn catalog(&self) -> &LevelCatalog {
        &self.inner.catalog
    }

    /// Returns the session configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Returns a copy of the current session state.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Calls `f` with the current session state.
    pub fn with_state<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    /// Returns the loading flag and the last recoverable error.
    #[must_use]
    pub fn load_status(&self) -> LoadStatus {
        self.inner.status.borrow().clone()
    }

    /// Queues `future` to run on the session's task queue.
    pub fn spawn(&self, future: impl Future<Output = ()> + 'static) {
        self.inner.tasks.spawn(future);
    }

    /// Polls queued work once; returns true if nothing is left to run.
    ///
    /// Call this once per event-loop turn. Work queued during a turn starts on the
    /// next one.
    pub fn run_pending(&self) -> bool {
        self.inner.tasks.poll();
        self.inner.tasks.is_idle()
    }

    /// Loads a fresh batch of problems for `level`.
    ///
    /// When the external source is enabled its problems are used first; a batch
    /// smaller than [`SessionConfig::min_external_problems`] is topped up with local
    /// problems, then the batch is cut to [`SessionConfig::batch_size`] and shuffled.
    /// If the source fails, the whole batch is generated locally and the failure is
    /// kept in [`LoadStatus::error`]. The future never fails.
    ///
    /// Overlapping loads are allowed; only the most recently created one installs
    /// its batch. A load is current from the moment this is called, not from when it
    /// is first polled.
    pub fn load_level(&self, level: LevelId) -> impl Future<Output = ()> + use<> {
        let load = self.inner.begin_load(level);
        async move {
            load.await;
        }
    }

    /// Starts a new game on level 1.
    ///
    /// Loads level 1, then resets progress: only level 1 is unlocked (every level
    /// when level skipping is enabled), nothing is completed, and the score is 0.
    /// If another load or a restore supersedes the level 1 load, progress is left
    /// alone.
    pub fn initialize(&self) -> impl Future<Output = ()> + use<> {
        let inner = Rc::clone(&self.inner);
        let load = inner.begin_load(LevelId::FIRST);
        async move {
            if !load.await {
                log::debug!("initialization superseded by a newer load");
                return;
            }

            let available: BTreeSet<LevelId> = if inner.config.features.allow_level_skipping {
                inner.catalog.ids().chain([LevelId::FIRST]).collect()
            } else {
                BTreeSet::from([LevelId::FIRST])
            };
            let mut state = inner.state.borrow_mut();
            state.available_levels = available;
            state.completed_levels.clear();
            state.current_level = LevelId::FIRST;
            state.score = 0;
            log::debug!("session initialized in {} mode", state.mode);
        }
    }

    /// Switches to `level` and queues its load.
    ///
    /// Does nothing if the catalog does not configure `level`. The problem data
    /// arrives once the load has run.
    pub fn jump_to_level(&self, level: LevelId) {
        if !self.inner.catalog.contains(level) {
            log::debug!("ignoring jump to unconfigured level {level}");
            return;
        }
        {
            let mut state = self.inner.state.borrow_mut();
            state.current_level = level;
            state.reset_problem_scope();
        }
        self.spawn(self.load_level(level));
    }

    /// Resumes a session from externally persisted data without regenerating it.
    ///
    /// `problem_index` is clamped into the batch. Answers and submission state are
    /// never restored. Does nothing if the catalog does not configure `level`.
    pub fn restore_state(&self, level: LevelId, problem_index: usize, problems: Vec<Problem>) {
        if !self.inner.catalog.contains(level) {
            log::debug!("ignoring restore of unconfigured level {level}");
            return;
        }
        // A load still in flight must not overwrite the restored batch.
        self.inner.invalidate_loads();

        let index = problem_index.min(problems.len().saturating_sub(1));
        let mut state = self.inner.state.borrow_mut();
        state.current_level = level;
        state.current_problem_index = index;
        let problem = problems.get(index).cloned();
        state.level_problems = problems;
        state.install_problem(problem);
    }

    /// Shows the batch entry at the current index, or a new local problem once the
    /// batch is used up.
    pub fn generate_next(&self) {
        let mut state = self.inner.state.borrow_mut();
        if let Some(problem) = state.level_problems.get(state.current_problem_index).cloned() {
            state.install_problem(Some(problem));
            return;
        }
        match self.inner.generate(state.current_level, None) {
            Ok(problem) => state.install_problem(Some(problem)),
            Err(err) => log::error!("failed to generate a problem: {err}"),
        }
    }

    /// Replaces the current problem with one built from the given operands.
    ///
    /// Zero operands are rejected without any state change.
    pub fn update_problem(&self, operand1: u32, operand2: u32) {
        if operand1 == 0 || operand2 == 0 {
            return;
        }
        let mut state = self.inner.state.borrow_mut();
        match self
            .inner
            .generate(state.current_level, Some((operand1, operand2)))
        {
            Ok(problem) => state.install_problem(Some(problem)),
            Err(err) => log::debug!("rejected edited operands: {err}"),
        }
    }

    /// Records `value` for `field`, replacing any earlier answer for the field.
    ///
    /// Before the first submission the answer waits, unvalidated, for submission.
    /// Afterwards it is marked pending, the problem is no longer complete, and it is
    /// only validated by the next [`GameSession::submit_problem`].
    pub fn submit_answer(&self, field: FieldId, value: u32) {
        let mut state = self.inner.state.borrow_mut();
        let correctness = if state.is_submitted {
            Correctness::Pending
        } else {
            Correctness::Incorrect
        };
        state
            .answers
            .upsert(Answer::new(field, value).with_correctness(correctness));
        state.mark_answers_changed();
    }

    /// Removes the answer for `field`.
    pub fn clear_answer(&self, field: FieldId) {
        let mut state = self.inner.state.borrow_mut();
        state.answers.remove(field);
        state.mark_answers_changed();
    }

    /// Validates every answer and decides whether the problem is complete.
    ///
    /// The first completion of a problem awards the configured points, marks the
    /// current level completed, and unlocks the next level if the catalog has one.
    /// Does nothing if no problem is loaded.
    pub fn submit_problem(&self) {
        let mut state = self.inner.state.borrow_mut();
        let state = &mut *state;
        let Some(problem) = &state.problem else {
            return;
        };

        state
            .answers
            .revalidate(|answer| validate::validate(problem, answer).into());
        let complete = validate::is_complete(problem, &state.answers);

        if complete && !state.awarded {
            state.awarded = true;
            state.score += self.inner.config.points_per_problem;
            state.completed_levels.insert(state.current_level);

            let next = state.current_level.next();
            if self.inner.catalog.contains(next) && state.available_levels.insert(next) {
                log::info!("level {next} unlocked");
            }
        }

        state.is_submitted = true;
        state.is_complete = complete;
    }

    /// Moves on to the next problem.
    ///
    /// Within a batch this is the next entry. After the last entry the session
    /// advances to the next level if it is unlocked; that level's load is queued and
    /// only starts on the next event-loop turn, so the level change is observable
    /// first. Otherwise practice continues with a new problem for the current level.
    pub fn next_problem(&self) {
        let mut state = self.inner.state.borrow_mut();
        log::debug!(
            "next problem requested: index={} batch={} level={}",
            state.current_problem_index,
            state.level_problems.len(),
            state.current_level,
        );

        let next_index = state.current_problem_index + 1;
        if let Some(problem) = state.level_problems.get(next_index).cloned() {
            state.current_problem_index = next_index;
            state.install_problem(Some(problem));
            return;
        }

        let next_level = state.current_level.next();
        if state.available_levels.contains(&next_level) {
            log::debug!("advancing to level {next_level}");
            state.current_level = next_level;
            state.current_problem_index = 0;
            state.install_problem(None);
            drop(state);
            self.spawn(self.load_level(next_level));
            return;
        }

        log::debug!("no next level unlocked, continuing practice");
        match self.inner.generate(state.current_level, None) {
            Ok(problem) => state.install_problem(Some(problem)),
            Err(err) => log::error!("failed to generate a problem: {err}"),
        }
    }

    /// Lets the player edit the operands of the current problem.
    pub fn enable_editing(&self) {
        let mut state = self.inner.state.borrow_mut();
        let Some(problem) = state.problem.take() else {
            return;
        };
        state.problem = Some(problem.with_editable(true));
        state.is_submitted = false;
        state.is_complete = false;
    }

    /// Ends editing, optionally rebuilding the problem from new operands.
    ///
    /// New operands that differ from the current ones and are both non-zero rebuild
    /// the problem; answers whose step still exists are carried over unvalidated and
    /// the submission state is cleared. Otherwise only the editable flag is turned
    /// off and the answers stay as they are.
    pub fn disable_editing(&self, new_operands: Option<(u32, u32)>) {
        let mut state = self.inner.state.borrow_mut();
        let state = &mut *state;
        let Some(problem) = &state.problem else {
            return;
        };

        let rebuilt = new_operands
            .filter(|&(a, b)| (a, b) != problem.operands() && a > 0 && b > 0)
            .and_then(|operands| {
                self.inner
                    .generate(state.current_level, Some(operands))
                    .inspect_err(|err| log::debug!("rejected edited operands: {err}"))
                    .ok()
            });

        let Some(rebuilt) = rebuilt else {
            state.problem = Some(problem.with_editable(false));
            return;
        };

        state
            .answers
            .retain(|answer| rebuilt.has_step(answer.field.step));
        state.answers.revalidate(|_| Correctness::Incorrect);
        state.problem = Some(rebuilt.with_editable(false));
        state.is_submitted = false;
        state.is_complete = false;
        state.awarded = false;
    }
}

impl SessionInner {
    fn external_source(&self) -> Option<&Rc<dyn ProblemSource>> {
        self.source
            .as_ref()
            .filter(|_| self.config.features.use_external_source)
    }

    fn generate(
        &self,
        level: LevelId,
        operands: Option<(u32, u32)>,
    ) -> Result<Problem, GenerateError> {
        self.generator
            .borrow_mut()
            .generate_for(&self.catalog, level, operands)
    }

    fn invalidate_loads(&self) -> u64 {
        let token = self.latest_load.get() + 1;
        self.latest_load.set(token);
        self.status.borrow_mut().is_loading = false;
        token
    }

    fn is_current(&self, token: u64) -> bool {
        self.latest_load.get() == token
    }

    /// Takes the load token now and returns the load itself, which resolves to
    /// whether it was still the latest load when it finished.
    fn begin_load(self: &Rc<Self>, level_id: LevelId) -> impl Future<Output = bool> + use<> {
        let token = self.invalidate_loads();
        *self.status.borrow_mut() = LoadStatus {
            is_loading: true,
            error: None,
        };
        Rc::clone(self).load_level(level_id, token)
    }

    async fn load_level(self: Rc<Self>, level_id: LevelId, token: u64) -> bool {
        if !self.is_current(token) {
            log::debug!("skipping superseded load of level {level_id}");
            return false;
        }
        let Some(level) = self.catalog.get(level_id).copied() else {
            log::warn!("cannot load unconfigured level {level_id}");
            *self.status.borrow_mut() = LoadStatus {
                is_loading: false,
                error: Some(LoadError::UnknownLevel { level: level_id }),
            };
            return true;
        };

        let request = self
            .external_source()
            .map(|source| source.fetch_problems(level_id));
        let fetched = match request {
            Some(request) => request.await,
            None => Ok(Vec::new()),
        };

        if !self.is_current(token) {
            log::warn!("discarding stale problem batch for level {level_id}");
            return false;
        }

        let (batch, error) = match fetched {
            Ok(external) => (self.assemble_batch(&level, external), None),
            Err(source) => {
                log::warn!("{source}; generating level {level_id} locally");
                let batch = self
                    .generator
                    .borrow_mut()
                    .generate_batch(&level, self.config.batch_size);
                (batch, Some(LoadError::Fetch { source }))
            }
        };

        let error = match batch {
            Ok(batch) => {
                log::debug!("loaded {} problems for level {level_id}", batch.len());
                self.state.borrow_mut().install_batch(batch);
                error
            }
            Err(source) => {
                log::error!("failed to generate problems for level {level_id}: {source}");
                Some(LoadError::Generate { source })
            }
        };

        *self.status.borrow_mut() = LoadStatus {
            is_loading: false,
            error,
        };
        true
    }

    fn assemble_batch(
        &self,
        level: &Level,
        mut problems: Vec<Problem>,
    ) -> Result<Vec<Problem>, GenerateError> {
        let fetched = problems.len();
        problems.retain(|problem| problem.mode() == level.mode());
        if problems.len() < fetched {
            log::warn!(
                "dropped {} fetched problems of the wrong mode",
                fetched - problems.len()
            );
        }

        let mut generator = self.generator.borrow_mut();
        if problems.len() < self.config.min_external_problems {
            let needed = self.config.batch_size.saturating_sub(problems.len());
            problems.extend(generator.generate_batch(level, needed)?);
        }
        problems.truncate(self.config.batch_size);
        generator.shuffle(&mut problems);
        Ok(problems)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use futures_channel::oneshot;
    use longhand_core::AdditionField;

    use super::*;
    use crate::source::{FetchFuture, PresetSource};

    fn addition_session(config: SessionConfig) -> GameSession {
        GameSession::builder(LevelCatalog::addition())
            .config(config)
            .seed(7)
            .build()
    }

    fn run_until_idle(session: &GameSession) {
        for _ in 0..16 {
            if session.run_pending() {
                return;
            }
        }
        panic!("session work did not finish");
    }

    fn load(session: &GameSession, level: LevelId) {
        session.spawn(session.load_level(level));
        run_until_idle(session);
    }

    /// Problems no built-in addition level generates.
    fn marked(count: u32, base: u32) -> Vec<Problem> {
        (0..count).map(|i| Problem::addition(base + i, 1000)).collect()
    }

    fn occurrences(state: &SessionState, problem: &Problem) -> usize {
        state
            .level_problems()
            .iter()
            .filter(|p| *p == problem)
            .count()
    }

    fn answer_47_plus_38(session: &GameSession) {
        session.submit_answer(FieldId::sum(0), 5);
        session.submit_answer(FieldId::carry(0), 1);
        session.submit_answer(FieldId::sum(1), 8);
    }

    /// A source whose n-th request resolves when the n-th sender fires.
    fn channel_source(receivers: Vec<oneshot::Receiver<Vec<Problem>>>) -> impl ProblemSource {
        let receivers = RefCell::new(VecDeque::from(receivers));
        move |_level: LevelId| -> FetchFuture {
            let receiver = receivers.borrow_mut().pop_front();
            Box::pin(async move {
                match receiver {
                    Some(receiver) => receiver.await.map_err(|_| FetchError::Unavailable {
                        reason: "request dropped".to_owned(),
                    }),
                    None => Ok(Vec::new()),
                }
            })
        }
    }

    #[test]
    fn test_new_session_state() {
        let state = addition_session(SessionConfig::default()).snapshot();
        assert_eq!(state.mode(), GameMode::Addition);
        assert_eq!(state.current_level(), LevelId::FIRST);
        assert_eq!(
            state.available_levels().iter().copied().collect::<Vec<_>>(),
            [LevelId::FIRST]
        );
        assert!(state.completed_levels().is_empty());
        assert!(state.problem().is_none());
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_local_load_fills_batch() {
        let session = addition_session(SessionConfig::default());
        load(&session, LevelId(3));

        let state = session.snapshot();
        assert_eq!(state.level_problems().len(), 10);
        assert_eq!(state.current_problem_index(), 0);
        assert_eq!(state.problem(), state.level_problems().first());
        assert!(state.answers().is_empty());
        assert!(!state.is_submitted());
        assert_eq!(session.load_status(), LoadStatus::default());
    }

    #[test]
    fn test_small_external_batch_is_topped_up() {
        let presets = marked(3, 5000);
        let session = GameSession::builder(LevelCatalog::addition())
            .config(SessionConfig::default().use_external_source(true))
            .source(PresetSource::new().with_level(LevelId::FIRST, presets.clone()))
            .seed(1)
            .build();
        load(&session, LevelId::FIRST);

        let state = session.snapshot();
        assert_eq!(state.level_problems().len(), 10);
        for problem in &presets {
            assert_eq!(occurrences(&state, problem), 1);
        }
    }

    #[test]
    fn test_large_external_batch_is_truncated() {
        let session = GameSession::builder(LevelCatalog::addition())
            .config(SessionConfig::default().use_external_source(true))
            .source(PresetSource::new().with_level(LevelId::FIRST, marked(12, 5000)))
            .build();
        load(&session, LevelId::FIRST);

        let state = session.snapshot();
        assert_eq!(state.level_problems().len(), 10);
        assert!(
            state
                .level_problems()
                .iter()
                .all(|p| p.operands().0 >= 5000)
        );
    }

    #[test]
    fn test_external_batch_at_minimum_is_kept_as_is() {
        let session = GameSession::builder(LevelCatalog::addition())
            .config(SessionConfig::default().use_external_source(true))
            .source(PresetSource::new().with_level(LevelId::FIRST, marked(8, 5000)))
            .build();
        load(&session, LevelId::FIRST);

        let state = session.snapshot();
        assert_eq!(state.level_problems().len(), 8);
    }

    #[test]
    fn test_external_source_ignored_when_disabled() {
        let session = GameSession::builder(LevelCatalog::addition())
            .source(PresetSource::new().with_level(LevelId::FIRST, marked(10, 5000)))
            .build();
        load(&session, LevelId::FIRST);

        let state = session.snapshot();
        assert!(state.level_problems().iter().all(|p| p.operands().0 < 10));
    }

    #[test]
    fn test_wrong_mode_external_problems_are_dropped() {
        let division = Problem::division(84, 4).unwrap();
        let session = GameSession::builder(LevelCatalog::addition())
            .config(SessionConfig::default().use_external_source(true))
            .source(PresetSource::new().with_level(LevelId::FIRST, vec![division; 10]))
            .build();
        load(&session, LevelId::FIRST);

        let state = session.snapshot();
        assert_eq!(state.level_problems().len(), 10);
        assert!(
            state
                .level_problems()
                .iter()
                .all(|p| p.mode() == GameMode::Addition)
        );
    }

    #[test]
    fn test_fetch_failure_falls_back_to_local_generation() {
        let failing = |_level: LevelId| -> FetchFuture {
            Box::pin(std::future::ready(Err(FetchError::Unavailable {
                reason: "offline".to_owned(),
            })))
        };
        let session = GameSession::builder(LevelCatalog::addition())
            .config(SessionConfig::default().use_external_source(true))
            .source(failing)
            .build();
        load(&session, LevelId::FIRST);

        let state = session.snapshot();
        assert_eq!(state.level_problems().len(), 10);
        assert!(state.problem().is_some());

        let status = session.load_status();
        assert!(!status.is_loading);
        let error = status.error.unwrap();
        assert!(matches!(error, LoadError::Fetch { .. }));
        assert_eq!(error.to_string(), "Failed to load problems. Please try again.");
    }

    #[test]
    fn test_loading_unknown_level_reports_error() {
        let session = addition_session(SessionConfig::default());
        load(&session, LevelId(99));

        assert!(session.snapshot().level_problems().is_empty());
        assert_eq!(
            session.load_status().error,
            Some(LoadError::UnknownLevel { level: LevelId(99) })
        );
    }

    #[test]
    fn test_stale_load_is_discarded() {
        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();
        let session = GameSession::builder(LevelCatalog::addition())
            .config(SessionConfig::default().use_external_source(true))
            .source(channel_source(vec![first_rx, second_rx]))
            .build();

        session.spawn(session.load_level(LevelId::FIRST));
        assert!(!session.run_pending());
        assert!(session.load_status().is_loading);

        session.jump_to_level(LevelId(2));
        assert!(!session.run_pending());

        let newer = marked(10, 7000);
        second_tx.send(newer.clone()).unwrap();
        assert!(!session.run_pending());
        assert!(!session.load_status().is_loading);

        first_tx.send(marked(10, 9000)).unwrap();
        assert!(session.run_pending());

        let state = session.snapshot();
        assert_eq!(state.current_level(), LevelId(2));
        let mut loaded = state.level_problems().to_vec();
        loaded.sort_by_key(Problem::operands);
        assert_eq!(loaded, newer);
        assert!(!session.load_status().is_loading);
    }

    #[test]
    fn test_restore_state_supersedes_inflight_load() {
        let (tx, rx) = oneshot::channel();
        let session = GameSession::builder(LevelCatalog::addition())
            .config(SessionConfig::default().use_external_source(true))
            .source(channel_source(vec![rx]))
            .build();

        session.spawn(session.load_level(LevelId::FIRST));
        session.run_pending();
        let restored = vec![Problem::addition(47, 38)];
        session.restore_state(LevelId(3), 0, restored.clone());
        assert!(!session.load_status().is_loading);

        tx.send(marked(10, 5000)).unwrap();
        run_until_idle(&session);

        let state = session.snapshot();
        assert_eq!(state.level_problems(), restored);
        assert_eq!(state.current_level(), LevelId(3));
    }

    #[test]
    fn test_restore_state_supersedes_queued_load() {
        let session = addition_session(SessionConfig::default());
        session.jump_to_level(LevelId(4));
        assert!(session.load_status().is_loading);

        let restored = vec![Problem::addition(47, 38)];
        session.restore_state(LevelId(2), 0, restored.clone());
        assert!(!session.load_status().is_loading);
        run_until_idle(&session);

        let state = session.snapshot();
        assert_eq!(state.current_level(), LevelId(2));
        assert_eq!(state.level_problems(), restored);
        assert_eq!(state.problem(), restored.first());
        assert!(!session.load_status().is_loading);
    }

    #[test]
    fn test_initialize_superseded_by_jump_keeps_new_level() {
        let session = addition_session(SessionConfig::default());
        session.spawn(session.initialize());
        session.jump_to_level(LevelId(3));
        run_until_idle(&session);

        let state = session.snapshot();
        assert_eq!(state.current_level(), LevelId(3));
        assert_eq!(state.level_problems().len(), 10);
        assert!(!session.load_status().is_loading);
    }

    #[test]
    fn test_loaded_batch_is_shuffled() {
        let fetched = marked(10, 5000);
        let session = GameSession::builder(LevelCatalog::addition())
            .config(SessionConfig::default().use_external_source(true))
            .source(PresetSource::new().with_level(LevelId::FIRST, fetched.clone()))
            .seed(1)
            .build();
        load(&session, LevelId::FIRST);

        let state = session.snapshot();
        assert_ne!(state.level_problems(), fetched);
        let mut loaded = state.level_problems().to_vec();
        loaded.sort_by_key(Problem::operands);
        assert_eq!(loaded, fetched);
    }

    #[test]
    fn test_initialize_resets_progress() {
        let session = addition_session(SessionConfig::default());
        session.restore_state(LevelId::FIRST, 0, vec![Problem::addition(47, 38)]);
        answer_47_plus_38(&session);
        session.submit_problem();
        assert_eq!(session.snapshot().score(), 10);

        session.spawn(session.initialize());
        run_until_idle(&session);

        let state = session.snapshot();
        assert_eq!(state.score(), 0);
        assert!(state.completed_levels().is_empty());
        assert_eq!(state.available_levels().len(), 1);
        assert_eq!(state.current_level(), LevelId::FIRST);
        assert_eq!(state.level_problems().len(), 10);
    }

    #[test]
    fn test_initialize_with_level_skipping_unlocks_all() {
        let session = addition_session(SessionConfig::default().allow_level_skipping(true));
        session.spawn(session.initialize());
        run_until_idle(&session);

        let state = session.snapshot();
        assert_eq!(
            state.available_levels().iter().copied().collect::<Vec<_>>(),
            session.catalog().ids().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_jump_to_level() {
        let session = addition_session(SessionConfig::default());
        session.restore_state(LevelId::FIRST, 0, vec![Problem::addition(2, 3)]);
        session.submit_answer(FieldId::sum(0), 5);

        session.jump_to_level(LevelId(4));
        let state = session.snapshot();
        assert_eq!(state.current_level(), LevelId(4));
        assert!(state.answers().is_empty());

        run_until_idle(&session);
        let state = session.snapshot();
        assert_eq!(state.level_problems().len(), 10);
        assert!(state.level_problems().iter().all(|p| p.operands().0 >= 10));
    }

    #[test]
    fn test_jump_to_unconfigured_level_is_ignored() {
        let session = addition_session(SessionConfig::default());
        let before = session.snapshot();
        session.jump_to_level(LevelId(42));
        assert!(session.run_pending());
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_restore_state_clamps_index() {
        let session = addition_session(SessionConfig::default());
        let problems = marked(3, 5000);

        session.restore_state(LevelId(2), 7, problems.clone());
        let state = session.snapshot();
        assert_eq!(state.current_level(), LevelId(2));
        assert_eq!(state.current_problem_index(), 2);
        assert_eq!(state.problem(), Some(&problems[2]));

        session.restore_state(LevelId(2), 5, Vec::new());
        let state = session.snapshot();
        assert_eq!(state.current_problem_index(), 0);
        assert!(state.problem().is_none());
    }

    #[test]
    fn test_restore_unconfigured_level_is_ignored() {
        let session = addition_session(SessionConfig::default());
        let before = session.snapshot();
        session.restore_state(LevelId(0), 0, marked(3, 5000));
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_generate_next() {
        let session = addition_session(SessionConfig::default());
        let problems = marked(3, 5000);
        session.restore_state(LevelId::FIRST, 1, problems.clone());
        session.submit_answer(FieldId::sum(0), 1);

        session.generate_next();
        let state = session.snapshot();
        assert_eq!(state.problem(), Some(&problems[1]));
        assert!(state.answers().is_empty());

        session.restore_state(LevelId::FIRST, 0, Vec::new());
        session.generate_next();
        let (a, b) = session.snapshot().problem().unwrap().operands();
        assert!(a < 10 && b < 10);
    }

    #[test]
    fn test_update_problem() {
        let session = addition_session(SessionConfig::default());
        session.restore_state(LevelId::FIRST, 0, vec![Problem::addition(2, 3)]);
        session.submit_answer(FieldId::sum(0), 5);
        session.submit_problem();

        session.update_problem(12, 4);
        let state = session.snapshot();
        assert_eq!(state.problem(), Some(&Problem::addition(12, 4)));
        assert!(state.answers().is_empty());
        assert!(!state.is_submitted());
        assert!(!state.is_complete());
    }

    #[test]
    fn test_update_problem_rejects_zero_operands() {
        let session = addition_session(SessionConfig::default());
        session.restore_state(LevelId::FIRST, 0, vec![Problem::addition(2, 3)]);
        session.submit_answer(FieldId::sum(0), 5);
        let before = session.snapshot();

        session.update_problem(0, 4);
        session.update_problem(4, 0);
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_submit_answer_replaces_previous_value() {
        let session = addition_session(SessionConfig::default());
        session.restore_state(LevelId::FIRST, 0, vec![Problem::addition(2, 3)]);
        session.submit_answer(FieldId::sum(0), 4);
        session.submit_answer(FieldId::sum(0), 5);

        let state = session.snapshot();
        assert_eq!(state.answers().len(), 1);
        let answer = state.answers().get(FieldId::sum(0)).unwrap();
        assert_eq!(answer.value, 5);
        assert_eq!(answer.correctness, Correctness::Incorrect);
    }

    #[test]
    fn test_complete_problem_awards_points_once() {
        let session = addition_session(SessionConfig::default());
        session.restore_state(LevelId::FIRST, 0, vec![Problem::addition(47, 38)]);
        answer_47_plus_38(&session);

        session.submit_problem();
        let state = session.snapshot();
        assert!(state.is_submitted());
        assert!(state.is_complete());
        assert_eq!(state.score(), 10);
        assert!(state.completed_levels().contains(&LevelId::FIRST));
        assert_eq!(
            state.available_levels().iter().copied().collect::<Vec<_>>(),
            [LevelId(1), LevelId(2)]
        );

        session.submit_problem();
        session.enable_editing();
        session.disable_editing(Some((47, 38)));
        session.submit_problem();
        let state = session.snapshot();
        assert!(state.is_complete());
        assert_eq!(state.score(), 10);
        assert_eq!(state.available_levels().len(), 2);
    }

    #[test]
    fn test_incomplete_submission_scores_nothing() {
        let session = addition_session(SessionConfig::default());
        session.restore_state(LevelId::FIRST, 0, vec![Problem::addition(47, 38)]);
        session.submit_answer(FieldId::sum(0), 5);
        session.submit_answer(FieldId::sum(1), 8);
        session.submit_problem();

        let state = session.snapshot();
        assert!(state.is_submitted());
        assert!(!state.is_complete());
        assert_eq!(state.score(), 0);
        assert!(state.answers().iter().all(|a| a.correctness.is_correct()));
        assert_eq!(state.available_levels().len(), 1);
    }

    #[test]
    fn test_corrected_answer_completes_on_resubmit() {
        let session = addition_session(SessionConfig::default());
        session.restore_state(LevelId::FIRST, 0, vec![Problem::addition(2, 3)]);

        session.submit_answer(FieldId::sum(0), 6);
        session.submit_problem();
        let state = session.snapshot();
        assert!(!state.is_complete());
        assert!(
            state
                .answers()
                .get(FieldId::sum(0))
                .unwrap()
                .correctness
                .is_incorrect()
        );

        session.submit_answer(FieldId::sum(0), 5);
        let state = session.snapshot();
        assert!(state.is_submitted());
        assert!(!state.is_complete());
        assert!(
            state
                .answers()
                .get(FieldId::sum(0))
                .unwrap()
                .correctness
                .is_pending()
        );

        session.submit_problem();
        let state = session.snapshot();
        assert!(state.is_complete());
        assert_eq!(state.score(), 10);
    }

    #[test]
    fn test_clearing_answer_after_completion() {
        let session = addition_session(SessionConfig::default());
        session.restore_state(LevelId::FIRST, 0, vec![Problem::addition(2, 3)]);
        session.submit_answer(FieldId::sum(0), 5);
        session.submit_problem();
        assert!(session.snapshot().is_complete());

        session.clear_answer(FieldId::sum(0));
        let state = session.snapshot();
        assert!(state.answers().is_empty());
        assert!(!state.is_complete());

        session.submit_problem();
        let state = session.snapshot();
        assert!(!state.is_complete());
        assert_eq!(state.score(), 10);
    }

    #[test]
    fn test_submit_without_problem_does_nothing() {
        let session = addition_session(SessionConfig::default());
        session.submit_problem();
        assert!(!session.snapshot().is_submitted());
    }

    #[test]
    fn test_next_problem_within_batch() {
        let session = addition_session(SessionConfig::default());
        let problems = marked(3, 5000);
        session.restore_state(LevelId::FIRST, 0, problems.clone());
        session.submit_answer(FieldId::sum(0), 1);
        session.submit_problem();

        session.next_problem();
        let state = session.snapshot();
        assert_eq!(state.current_problem_index(), 1);
        assert_eq!(state.problem(), Some(&problems[1]));
        assert!(state.answers().is_empty());
        assert!(!state.is_submitted());
    }

    #[test]
    fn test_next_problem_advances_level_on_next_turn() {
        let session = addition_session(SessionConfig::default());
        session.restore_state(LevelId::FIRST, 0, vec![Problem::addition(47, 38)]);
        answer_47_plus_38(&session);
        session.submit_problem();

        session.next_problem();
        let state = session.snapshot();
        assert_eq!(state.current_level(), LevelId(2));
        assert_eq!(state.current_problem_index(), 0);
        assert!(state.problem().is_none());
        assert!(session.load_status().is_loading);

        assert!(session.run_pending());
        assert!(!session.load_status().is_loading);
        let state = session.snapshot();
        assert_eq!(state.level_problems().len(), 10);
        assert_eq!(state.problem(), state.level_problems().first());
    }

    #[test]
    fn test_next_problem_keeps_practicing_without_unlock() {
        let session = addition_session(SessionConfig::default());
        let problems = vec![Problem::addition(2, 3)];
        session.restore_state(LevelId::FIRST, 0, problems.clone());

        session.next_problem();
        assert!(session.run_pending());
        let state = session.snapshot();
        assert_eq!(state.current_level(), LevelId::FIRST);
        assert_eq!(state.current_problem_index(), 0);
        assert_eq!(state.level_problems(), problems);
        let (a, b) = state.problem().unwrap().operands();
        assert!(a < 10 && b < 10);
    }

    #[test]
    fn test_next_problem_on_last_level_keeps_practicing() {
        let session = addition_session(SessionConfig::default().allow_level_skipping(true));
        session.spawn(session.initialize());
        run_until_idle(&session);
        session.restore_state(LevelId(6), 9, marked(10, 5000));

        session.next_problem();
        let state = session.snapshot();
        assert_eq!(state.current_level(), LevelId(6));
        let (a, _) = state.problem().unwrap().operands();
        assert!((1000..10_000).contains(&a));
    }

    #[test]
    fn test_enable_editing_clears_submission() {
        let session = addition_session(SessionConfig::default());
        session.restore_state(LevelId::FIRST, 0, vec![Problem::addition(2, 3)]);
        session.submit_answer(FieldId::sum(0), 5);
        session.submit_problem();

        session.enable_editing();
        let state = session.snapshot();
        assert!(state.problem().unwrap().is_editable());
        assert!(!state.is_submitted());
        assert!(!state.is_complete());
        assert_eq!(state.answers().len(), 1);
    }

    #[test]
    fn test_disable_editing_carries_answers_forward() {
        let session = addition_session(SessionConfig::default());
        session.restore_state(LevelId::FIRST, 0, vec![Problem::addition(47, 38)]);
        answer_47_plus_38(&session);
        session.submit_problem();
        session.enable_editing();

        session.disable_editing(Some((5, 3)));
        let state = session.snapshot();
        let problem = state.problem().unwrap();
        assert_eq!(problem.operands(), (5, 3));
        assert!(!problem.is_editable());
        assert!(!state.is_submitted());

        let kept: Vec<_> = state.answers().iter().map(|a| a.field).collect();
        assert_eq!(kept, [FieldId::sum(0), FieldId::carry(0)]);
        assert!(
            state
                .answers()
                .iter()
                .all(|a| a.correctness.is_incorrect())
        );
        assert_eq!(
            state.answers().get(FieldId::new(0, AdditionField::Sum, 0)).unwrap().value,
            5
        );
    }

    #[test]
    fn test_disable_editing_without_change_keeps_answers() {
        let session = addition_session(SessionConfig::default());
        session.restore_state(LevelId::FIRST, 0, vec![Problem::addition(47, 38)]);
        session.submit_answer(FieldId::sum(1), 8);
        session.enable_editing();

        for operands in [None, Some((47, 38)), Some((0, 38))] {
            session.disable_editing(operands);
            let state = session.snapshot();
            let problem = state.problem().unwrap();
            assert_eq!(problem.operands(), (47, 38));
            assert!(!problem.is_editable());
            assert_eq!(state.answers().len(), 1);
        }
    }

    #[test]
    fn test_division_session_completes_problem() {
        let session = GameSession::builder(LevelCatalog::division()).seed(5).build();
        let problem = Problem::division(84, 4).unwrap();
        session.restore_state(LevelId::FIRST, 0, vec![problem.clone()]);

        for field in problem.fields() {
            session.submit_answer(field, problem.expected_value(field).unwrap());
        }
        session.submit_problem();

        let state = session.snapshot();
        assert_eq!(state.mode(), GameMode::Division);
        assert!(state.is_complete());
        assert_eq!(state.score(), 10);
    }

    #[test]
    fn test_clones_share_state() {
        let session = addition_session(SessionConfig::default());
        let other = session.clone();
        session.restore_state(LevelId::FIRST, 0, vec![Problem::addition(2, 3)]);
        other.submit_answer(FieldId::sum(0), 5);
        assert_eq!(session.with_state(|s| s.answers().len()), 1);
    }
}
