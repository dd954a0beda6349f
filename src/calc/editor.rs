//! Editing session for the calculation attached to one aggregate.
//!
//! The editor owns a single [`CalculationVariant`]. Selecting another kind
//! replaces it with a fresh variant and bumps the generation counter; metadata
//! responses stamped with an older generation are discarded. Changing the
//! break-by dimension keeps the loaded capability map, but the reset options
//! only apply to the dimension they were fetched for. [`CalcEditor::commit`]
//! normalizes the variant and reports what was coerced.

use serde::Serialize;

use super::types::{CalcKind, PercentLevel, ResetLevel, ResetScope};
use super::variant::{CalculationVariant, PercentCalc};
use crate::binding::{rederive_after_grouping_change, PercentDirection};
use crate::config::CalcDefaults;
use crate::error::CalcResult;
use crate::formula::{self, NValue};
use crate::metadata::{CalcMetadata, CalcMetadataProvider, MetadataRequest, MetadataResponse};
use crate::model::{GroupDimension, PercentageOption};

/// What the editor knows about the binding it edits.
#[derive(Debug, Clone, Default)]
pub struct EditorContext {
    /// Reference columns offered to change and value-of, in display order.
    pub columns: Vec<String>,
    pub groups: Vec<GroupDimension>,
    pub direction: PercentDirection,
}

impl EditorContext {
    pub fn first_column(&self) -> Option<&str> {
        self.columns.first().map(String::as_str)
    }
}

/// Result of committing the editor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitOutcome {
    pub variant: CalculationVariant,
    /// Percentage axis to store on the binding. Only set for percent variants.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage_option: Option<PercentageOption>,
    /// The inner aggregate's N was replaced by the default.
    pub n_coerced: bool,
    /// Window size of a moving variant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_size: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct CalcEditor {
    variant: CalculationVariant,
    generation: u64,
    metadata: Option<CalcMetadata>,
    /// Break-by dimension the loaded reset options were fetched for.
    options_break_by: Option<String>,
    context: EditorContext,
    defaults: CalcDefaults,
}

impl CalcEditor {
    /// Open the editor on `existing`, or on a fresh percent variant.
    pub fn open(
        existing: Option<CalculationVariant>,
        context: EditorContext,
        defaults: CalcDefaults,
    ) -> Self {
        let variant = existing.unwrap_or_else(|| {
            CalculationVariant::fresh(CalcKind::Percent, &defaults, context.first_column())
        });

        Self {
            variant,
            generation: 0,
            metadata: None,
            options_break_by: None,
            context,
            defaults,
        }
    }

    pub fn variant(&self) -> &CalculationVariant {
        &self.variant
    }

    /// Edit the current variant in place.
    ///
    /// Replacing the variant with one of another kind is treated like
    /// [`select_kind`](Self::select_kind): the generation is bumped and loaded
    /// metadata is dropped.
    pub fn update<R>(&mut self, edit: impl FnOnce(&mut CalculationVariant) -> R) -> R {
        let kind = self.variant.kind();
        let result = edit(&mut self.variant);
        if self.variant.kind() != kind {
            self.invalidate_metadata();
            tracing::debug!(
                kind = %self.variant.kind(),
                generation = self.generation,
                "calculation kind replaced"
            );
        }
        result
    }

    pub fn kind(&self) -> CalcKind {
        self.variant.kind()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn metadata(&self) -> Option<&CalcMetadata> {
        self.metadata.as_ref()
    }

    /// Loaded reset options, if they were fetched for the current break-by.
    pub fn reset_options(&self) -> Option<&[ResetLevel]> {
        let metadata = self.metadata.as_ref()?;
        let scope = self.variant.reset_scope()?;
        (scope.break_by == self.options_break_by).then_some(metadata.reset_options.as_slice())
    }

    pub fn context(&self) -> &EditorContext {
        &self.context
    }

    /// Switch to `kind`, discarding every field of the current variant.
    ///
    /// Returns false when `kind` is already selected.
    pub fn select_kind(&mut self, kind: CalcKind) -> bool {
        if self.variant.kind() == kind {
            return false;
        }

        self.variant = CalculationVariant::fresh(kind, &self.defaults, self.context.first_column());
        self.invalidate_metadata();
        tracing::debug!(%kind, generation = self.generation, "calculation kind selected");
        true
    }

    /// Change the break-by dimension.
    ///
    /// The capability map stays loaded; reset options must be reloaded for the
    /// new dimension before they are used again.
    pub fn set_break_by(&mut self, break_by: Option<String>) -> bool {
        let Some(scope) = self.variant.reset_scope_mut() else {
            return false;
        };
        if scope.break_by == break_by {
            return false;
        }

        scope.break_by = break_by;
        true
    }

    /// Replace the grouping shape and re-derive the dependent fields.
    pub fn regroup(&mut self, groups: Vec<GroupDimension>, direction: PercentDirection) -> bool {
        self.context.groups = groups;
        self.context.direction = direction;
        let changed = rederive_after_grouping_change(&mut self.variant, &self.context.groups);
        self.invalidate_metadata();
        changed
    }

    /// Stamp a metadata request with the current state.
    pub fn begin_metadata_request(&self) -> MetadataRequest {
        let break_by = self
            .variant
            .reset_scope()
            .and_then(|scope| scope.break_by.clone());
        MetadataRequest::new(self.generation, self.variant.kind(), break_by)
    }

    /// Apply a metadata response if it still matches the editor.
    pub fn apply_metadata(&mut self, response: MetadataResponse) -> bool {
        let request = &response.request;
        if request.generation != self.generation || request.kind != self.variant.kind() {
            tracing::debug!(
                request_generation = request.generation,
                request_kind = %request.kind,
                generation = self.generation,
                kind = %self.variant.kind(),
                "dropping stale metadata response"
            );
            return false;
        }

        self.options_break_by = response.request.break_by;
        self.metadata = Some(response.metadata);
        true
    }

    /// Request metadata from `provider` and apply it.
    pub async fn refresh_metadata<P>(&mut self, provider: &P) -> CalcResult<bool>
    where
        P: CalcMetadataProvider + ?Sized,
    {
        let response = provider.load(self.begin_metadata_request()).await?;
        Ok(self.apply_metadata(response))
    }

    /// Normalize the variant and report the result.
    pub fn commit(&mut self) -> CommitOutcome {
        let n_coerced = self.normalize_inner_n();
        self.normalize_reset_level();

        let window_size = match &mut self.variant {
            CalculationVariant::Moving(calc) => {
                calc.previous = calc.previous.max(0);
                calc.next = calc.next.max(0);
                Some(calc.window_size())
            }
            _ => None,
        };

        let percentage_option = match &self.variant {
            CalculationVariant::Percent(calc) => Some(self.percentage_axis(calc)),
            _ => None,
        };

        CommitOutcome {
            variant: self.variant.clone(),
            percentage_option,
            n_coerced,
            window_size,
        }
    }

    fn invalidate_metadata(&mut self) {
        self.generation += 1;
        self.metadata = None;
        self.options_break_by = None;
    }

    fn normalize_inner_n(&mut self) -> bool {
        let default_n = self.defaults.default_n.clone();
        let Some(aggregate) = self.variant.inner_aggregate_mut() else {
            return false;
        };

        let mut token = formula::decode(aggregate);
        if !token.descriptor().has_n || token.n().is_some_and(NValue::is_valid) {
            return false;
        }

        let n = NValue::parse(&default_n).unwrap_or(NValue::Number(1));
        tracing::debug!(aggregate = %aggregate, n = %n, "coercing inner aggregate N");
        token = token.with_n(n);
        *aggregate = token.encode();
        true
    }

    fn normalize_reset_level(&mut self) {
        let Some(metadata) = &self.metadata else {
            return;
        };
        let options_break_by = self.options_break_by.as_deref();
        let Some(scope) = self.variant.reset_scope_mut() else {
            return;
        };
        if scope.reset_level.is_none() {
            return;
        }

        if !reset_supported(metadata, options_break_by, scope) {
            tracing::debug!(
                reset_level = ?scope.reset_level,
                break_by = ?scope.break_by,
                "reset level not supported, forcing none"
            );
            scope.reset_level = ResetLevel::None;
        }
    }

    fn percentage_axis(&self, calc: &PercentCalc) -> PercentageOption {
        let grand_total = calc.level == PercentLevel::GrandTotal;
        let direction = self.context.direction;

        let requested = if direction.is_crosstab() {
            match (calc.by_row, calc.by_column, grand_total) {
                (true, _, true) => PercentageOption::RowGrandTotal,
                (true, _, false) => PercentageOption::RowGroup,
                (false, true, true) => PercentageOption::ColGrandTotal,
                (false, true, false) => PercentageOption::ColGroup,
                (false, false, _) => PercentageOption::None,
            }
        } else if grand_total {
            PercentageOption::GrandTotal
        } else {
            PercentageOption::Group
        };

        direction.resolve(requested).unwrap_or_else(|err| {
            tracing::debug!(error = %err, "percentage axis not legal, using none");
            PercentageOption::None
        })
    }
}

/// Whether `scope`'s reset level survives the loaded metadata.
///
/// The capability map covers every dimension. Reset options are only checked
/// when they were fetched for the scope's current break-by.
fn reset_supported(
    metadata: &CalcMetadata,
    options_break_by: Option<&str>,
    scope: &ResetScope,
) -> bool {
    if let Some(dimension) = scope.break_by.as_deref() {
        if !metadata.supports_reset(dimension) {
            return false;
        }
    }
    if scope.break_by.as_deref() == options_break_by {
        return metadata.reset_options.contains(&scope.reset_level);
    }
    true
}
