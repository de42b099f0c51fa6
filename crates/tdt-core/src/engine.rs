//! Engine façade (C7): orchestrates selection, tokenization, rule evaluation,
//! and emission behind a single `translate` entry point, plus a `refresh` that
//! atomically swaps in newly loaded scheme state (§4.7, §5).

use std::sync::{Arc, RwLock};

use percent_encoding::percent_decode_str;
use tracing::{debug, instrument, warn};

use crate::emitter::emit;
use crate::errors::{Result, TdtError};
use crate::hints::Hints;
use crate::model::{CompanyPrefixTable, LevelType, RuleType, SchemeSet};
use crate::rules::evaluate_rules;
use crate::selector::{select_input, select_output};
use crate::tokenizer::tokenize;

struct EngineState {
    schemes: SchemeSet,
    company_prefixes: CompanyPrefixTable,
}

/// The loaded-state callback an `Engine` is built with. Keeping this as a
/// plain closure, rather than a dependency on `tdt-loader`, is what lets the
/// core stay free of any filesystem or XML knowledge (§9) while still
/// supporting `refresh()`.
type Loader = Box<dyn Fn() -> Result<(SchemeSet, CompanyPrefixTable)> + Send + Sync>;

/// Builds once from a loader closure, then serves concurrent `translate`
/// calls against an immutable snapshot of its state. `refresh()` re-invokes
/// the loader and swaps the whole snapshot atomically, so an in-flight
/// `translate` never observes a half-loaded `SchemeSet` (§5).
pub struct Engine {
    state: RwLock<Arc<EngineState>>,
    loader: Loader,
}

impl Engine {
    /// Builds an engine directly from already-loaded state; `refresh()` on
    /// the result always fails with [`TdtError::InvalidArgument`], since
    /// there is no loader to re-invoke. Prefer [`Engine::with_loader`] when
    /// `refresh()` support is needed.
    pub fn new(schemes: SchemeSet, company_prefixes: CompanyPrefixTable) -> Self {
        Engine {
            state: RwLock::new(Arc::new(EngineState { schemes, company_prefixes })),
            loader: Box::new(|| {
                Err(TdtError::InvalidArgument(
                    "refresh() called on an engine built without a loader".to_string(),
                ))
            }),
        }
    }

    /// Builds an engine whose state is produced by `loader`, invoked once now
    /// and again on every `refresh()`.
    pub fn with_loader(
        loader: impl Fn() -> Result<(SchemeSet, CompanyPrefixTable)> + Send + Sync + 'static,
    ) -> Result<Self> {
        let (schemes, company_prefixes) = loader()?;
        Ok(Engine {
            state: RwLock::new(Arc::new(EngineState { schemes, company_prefixes })),
            loader: Box::new(loader),
        })
    }

    /// Re-executes the loader and atomically swaps in the new scheme state.
    #[instrument(skip_all, name = "engine.refresh")]
    pub fn refresh(&self) -> Result<()> {
        let (schemes, company_prefixes) = (self.loader)()?;
        let new_state = Arc::new(EngineState { schemes, company_prefixes });
        let mut guard = self.state.write().expect("engine state lock poisoned");
        *guard = new_state;
        debug!("scheme set refreshed");
        Ok(())
    }

    /// Translates `identifier` into `target_level`, given `hints`.
    ///
    /// Trims and percent-decodes the input, then runs selection → tokenize →
    /// rule-eval(EXTRACT) → rule-eval(FORMAT) → emit. Any subcomponent error
    /// propagates unchanged.
    #[instrument(skip(self, hints), fields(target = %target_level, identifier_len = identifier.len()))]
    pub fn translate(&self, identifier: &str, hints: &Hints, target_level: LevelType) -> Result<String> {
        let snapshot = {
            let guard = self.state.read().expect("engine state lock poisoned");
            Arc::clone(&guard)
        };

        let trimmed = identifier.trim();
        let decoded = percent_decode_str(trimmed).decode_utf8().map_err(|e| {
            TdtError::InvalidArgument(format!("identifier {trimmed:?} is not valid UTF-8 after percent-decoding: {e}"))
        })?;

        let result = self.translate_against(&snapshot, &decoded, hints, target_level);
        if let Err(err) = &result {
            warn!(error = %err, "translate failed");
        }
        result
    }

    /// Convenience overload (§6): parses `hints_str` and `target_level_str`
    /// before delegating to [`Engine::translate`].
    pub fn translate_str(&self, identifier: &str, hints_str: &str, target_level_str: &str) -> Result<String> {
        let hints = Hints::parse(hints_str)?;
        let target_level: LevelType = target_level_str.parse()?;
        self.translate(identifier, &hints, target_level)
    }

    fn translate_against(
        &self,
        state: &EngineState,
        identifier: &str,
        hints: &Hints,
        target_level: LevelType,
    ) -> Result<String> {
        let input = select_input(&state.schemes, identifier, hints)?;
        let output = select_output(&state.schemes, input, target_level)?;

        let scheme = &state.schemes.schemes[input.scheme_idx];
        let input_level = &scheme.levels[input.level_idx];
        let input_option = &input_level.options[input.option_idx];
        let output_level = &scheme.levels[output.level_idx];
        let output_option = &output_level.options[output.option_idx];

        debug!(
            scheme = %scheme.name,
            input_level = %input_level.level_type,
            output_level = %output_level.level_type,
            "selected scheme"
        );

        let mut tokens = tokenize(identifier, input_level, input_option, output_option)?;
        for (key, value) in hints.iter() {
            tokens.insert_if_absent(key.clone(), value.clone());
        }
        evaluate_rules(&input_level.rules, RuleType::Extract, &mut tokens, &state.company_prefixes)?;
        evaluate_rules(&output_level.rules, RuleType::Format, &mut tokens, &state.company_prefixes)?;

        emit(&tokens, &output_level.level_type, output_option)
    }
}
