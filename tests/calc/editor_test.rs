#[cfg(test)]
mod tests {
    use std::time::Duration;

    use aggcalc::binding::PercentDirection;
    use aggcalc::calc::{
        CalcEditor, CalcKind, CalculationVariant, EditorContext, MovingCalc, PercentCalc,
        PercentLevel, ResetLevel, ResetScope, RunningTotalCalc,
    };
    use aggcalc::config::CalcDefaults;
    use aggcalc::metadata::{CalcMetadataProvider, MetadataError, StaticMetadataProvider};
    use aggcalc::CalcError;
    use aggcalc::model::{DateLevel, GroupDimension, PercentageOption};
    use insta::assert_snapshot;
    use serde_json::Map;

    fn groups() -> Vec<GroupDimension> {
        vec![
            GroupDimension::new("Region"),
            GroupDimension::date("OrderDate", DateLevel::Day),
        ]
    }

    fn context(direction: PercentDirection) -> EditorContext {
        EditorContext {
            columns: vec!["OrderDate".to_string(), "Region".to_string()],
            groups: groups(),
            direction,
        }
    }

    fn running_total(aggregate: &str, level: ResetLevel, break_by: &str) -> CalculationVariant {
        CalculationVariant::RunningTotal(RunningTotalCalc {
            aggregate: aggregate.to_string(),
            reset: ResetScope {
                reset_level: level,
                break_by: Some(break_by.to_string()),
            },
            display_template: None,
            extra: Map::new(),
        })
    }

    fn moving(aggregate: &str, previous: i32, next: i32) -> CalculationVariant {
        CalculationVariant::Moving(MovingCalc {
            aggregate: aggregate.to_string(),
            previous,
            next,
            include_current_value: true,
            null_if_no_enough_value: false,
            inner_dim: String::new(),
            display_template: None,
            extra: Map::new(),
        })
    }

    fn percent(level: PercentLevel, by_row: bool, by_column: bool) -> CalculationVariant {
        CalculationVariant::Percent(PercentCalc {
            level,
            by_row,
            by_column,
            ..PercentCalc::default()
        })
    }

    fn open(variant: CalculationVariant, direction: PercentDirection) -> CalcEditor {
        CalcEditor::open(Some(variant), context(direction), CalcDefaults::default())
    }

    #[test]
    fn test_kind_transition_discards_previous_fields() {
        let mut editor = open(
            running_total("Sum", ResetLevel::Month, "Region"),
            PercentDirection::table(true),
        );

        assert!(editor.select_kind(CalcKind::Percent));
        assert_eq!(editor.variant(), &CalculationVariant::default());
        assert!(editor.variant().reset_scope().is_none());
        match editor.variant() {
            CalculationVariant::Percent(calc) => assert_eq!(calc.level, PercentLevel::GrandTotal),
            other => panic!("expected percent, got {:?}", other),
        }
    }

    #[test]
    fn test_fresh_variant_defaults() {
        let mut editor = open(CalculationVariant::default(), PercentDirection::default());

        editor.select_kind(CalcKind::Moving);
        assert_eq!(editor.variant(), &moving("Average", 2, 2));

        editor.select_kind(CalcKind::RunningTotal);
        assert_eq!(editor.variant().inner_aggregate(), Some("Sum"));
        assert_eq!(editor.variant().reset_level(), Some(ResetLevel::None));

        editor.select_kind(CalcKind::ValueOf);
        assert_eq!(editor.variant().column_name(), Some("OrderDate"));

        assert_eq!(editor.generation(), 3);
    }

    #[tokio::test]
    async fn test_reset_forced_to_none_for_unsupported_break_by() {
        let provider = StaticMetadataProvider::new(groups()).without_reset_support("Region");
        let mut editor = open(
            running_total("Sum", ResetLevel::Month, "Region"),
            PercentDirection::table(true),
        );

        let response = provider.load(editor.begin_metadata_request()).await.unwrap();
        assert!(editor.apply_metadata(response));

        let outcome = editor.commit();
        assert_eq!(outcome.variant.reset_level(), Some(ResetLevel::None));
        assert_eq!(
            outcome.variant.reset_scope().and_then(|s| s.break_by.as_deref()),
            Some("Region")
        );
    }

    #[tokio::test]
    async fn test_supported_reset_is_kept() {
        let provider = StaticMetadataProvider::new(groups()).without_reset_support("Region");
        let mut editor = open(
            running_total("Sum", ResetLevel::Month, "OrderDate"),
            PercentDirection::table(true),
        );

        let response = provider.load(editor.begin_metadata_request()).await.unwrap();
        assert!(editor.apply_metadata(response));
        assert_eq!(editor.commit().variant.reset_level(), Some(ResetLevel::Month));
    }

    #[tokio::test]
    async fn test_reset_outside_offered_options_is_dropped() {
        let provider = StaticMetadataProvider::new(groups());
        let mut editor = open(
            running_total("Sum", ResetLevel::Hour, "OrderDate"),
            PercentDirection::table(true),
        );

        let response = provider.load(editor.begin_metadata_request()).await.unwrap();
        editor.apply_metadata(response);
        assert_eq!(editor.commit().variant.reset_level(), Some(ResetLevel::None));
    }

    #[test]
    fn test_reset_untouched_without_metadata() {
        let mut editor = open(
            running_total("Sum", ResetLevel::Month, "Region"),
            PercentDirection::table(true),
        );
        assert_eq!(editor.commit().variant.reset_level(), Some(ResetLevel::Month));
    }

    #[tokio::test]
    async fn test_stale_response_after_kind_change_is_dropped() {
        let provider = StaticMetadataProvider::new(groups())
            .without_reset_support("Region")
            .with_latency(Duration::from_millis(20));
        let mut editor = open(
            running_total("Sum", ResetLevel::None, "Region"),
            PercentDirection::table(true),
        );

        let in_flight = provider.load(editor.begin_metadata_request());
        editor.select_kind(CalcKind::CompoundGrowth);
        let response = in_flight.await.unwrap();

        assert!(!editor.apply_metadata(response));
        assert!(editor.metadata().is_none());
    }

    #[tokio::test]
    async fn test_stale_response_for_same_kind_is_dropped() {
        let provider = StaticMetadataProvider::new(groups());
        let mut editor = open(
            running_total("Sum", ResetLevel::None, "Region"),
            PercentDirection::table(true),
        );

        let request = editor.begin_metadata_request();
        editor.select_kind(CalcKind::Moving);
        editor.select_kind(CalcKind::RunningTotal);

        let response = provider.load(request).await.unwrap();
        assert_eq!(response.request.kind, editor.kind());
        assert!(!editor.apply_metadata(response));
    }

    #[tokio::test]
    async fn test_refresh_metadata() {
        let mut editor = open(
            running_total("Sum", ResetLevel::Year, "OrderDate"),
            PercentDirection::table(true),
        );

        let provider = StaticMetadataProvider::new(groups());
        assert!(editor.refresh_metadata(&provider).await.unwrap());
        assert!(editor.metadata().unwrap().supports_reset("OrderDate"));

        let offline = provider.failing(MetadataError::Unavailable("timeout".to_string()));
        let err = editor.refresh_metadata(&offline).await.unwrap_err();
        assert!(matches!(err, CalcError::Metadata(e) if e.is_retriable()));
    }

    #[tokio::test]
    async fn test_break_by_change_keeps_capability_map() {
        let provider = StaticMetadataProvider::new(groups()).without_reset_support("Region");
        let mut editor = open(
            running_total("Sum", ResetLevel::None, "OrderDate"),
            PercentDirection::table(true),
        );
        assert!(editor.refresh_metadata(&provider).await.unwrap());
        let generation = editor.generation();

        assert!(editor.set_break_by(Some("Region".to_string())));
        assert_eq!(editor.generation(), generation);
        assert!(editor.metadata().is_some());
        assert!(editor.reset_options().is_none());

        editor.update(|variant| {
            if let Some(scope) = variant.reset_scope_mut() {
                scope.reset_level = ResetLevel::Month;
            }
        });
        assert_eq!(editor.commit().variant.reset_level(), Some(ResetLevel::None));
    }

    #[tokio::test]
    async fn test_options_for_previous_break_by_are_not_applied() {
        let mut dimensions = groups();
        dimensions.push(GroupDimension::new("Product"));
        let provider = StaticMetadataProvider::new(dimensions).without_reset_support("Region");
        let mut editor = open(
            running_total("Sum", ResetLevel::Month, "Region"),
            PercentDirection::table(true),
        );
        editor.refresh_metadata(&provider).await.unwrap();
        assert_eq!(editor.reset_options(), Some(&[ResetLevel::None][..]));

        editor.set_break_by(Some("Product".to_string()));
        assert_eq!(editor.commit().variant.reset_level(), Some(ResetLevel::Month));

        editor.refresh_metadata(&provider).await.unwrap();
        assert!(editor.reset_options().unwrap().contains(&ResetLevel::Month));
        assert_eq!(editor.commit().variant.reset_level(), Some(ResetLevel::Month));
    }

    #[tokio::test]
    async fn test_update_replacing_kind_drops_metadata() {
        let provider = StaticMetadataProvider::new(groups());
        let mut editor = open(
            running_total("Sum", ResetLevel::None, "OrderDate"),
            PercentDirection::table(true),
        );
        editor.refresh_metadata(&provider).await.unwrap();
        let generation = editor.generation();

        editor.update(|variant| {
            if let Some(scope) = variant.reset_scope_mut() {
                scope.break_by = None;
            }
        });
        assert_eq!(editor.generation(), generation);
        assert!(editor.metadata().is_some());

        editor.update(|variant| *variant = moving("Sum", 1, 1));
        assert_eq!(editor.kind(), CalcKind::Moving);
        assert!(editor.generation() > generation);
        assert!(editor.metadata().is_none());
    }

    #[test]
    fn test_invalid_inner_n_is_coerced() {
        let mut editor = open(moving("NthLargest(0)", 1, 1), PercentDirection::default());
        let outcome = editor.commit();
        assert!(outcome.n_coerced);
        assert_eq!(outcome.variant.inner_aggregate(), Some("NthLargest(1)"));

        let mut editor = open(
            running_total("PthPercentile(abc)", ResetLevel::None, "Region"),
            PercentDirection::default(),
        );
        let outcome = editor.commit();
        assert!(outcome.n_coerced);
        assert_eq!(outcome.variant.inner_aggregate(), Some("PthPercentile(1)"));
    }

    #[test]
    fn test_valid_inner_n_is_kept() {
        for aggregate in ["NthSmallest(4)", "NthLargest($(top))", "Average"] {
            let mut editor = open(moving(aggregate, 1, 1), PercentDirection::default());
            let outcome = editor.commit();
            assert!(!outcome.n_coerced, "{}", aggregate);
            assert_eq!(outcome.variant.inner_aggregate(), Some(aggregate));
        }
    }

    #[test]
    fn test_moving_window_is_clamped() {
        let mut editor = open(moving("Sum", -2, 3), PercentDirection::default());
        let outcome = editor.commit();

        assert_eq!(outcome.window_size, Some(4));
        match &outcome.variant {
            CalculationVariant::Moving(calc) => {
                assert_eq!(calc.previous, 0);
                assert_eq!(calc.next, 3);
            }
            other => panic!("expected moving, got {:?}", other),
        }
        assert!(outcome.percentage_option.is_none());
    }

    #[test]
    fn test_percent_axis_for_table() {
        let mut editor = open(
            percent(PercentLevel::SubTotal, false, false),
            PercentDirection::table(true),
        );
        assert_eq!(editor.commit().percentage_option, Some(PercentageOption::Group));

        let mut editor = open(
            percent(PercentLevel::GrandTotal, false, false),
            PercentDirection::table(false),
        );
        assert_eq!(
            editor.commit().percentage_option,
            Some(PercentageOption::GrandTotal)
        );

        let mut editor = open(
            percent(PercentLevel::Dimension(0), false, false),
            PercentDirection::table(false),
        );
        assert_eq!(editor.commit().percentage_option, Some(PercentageOption::None));
    }

    #[test]
    fn test_percent_axis_for_crosstab() {
        let rows_only = PercentDirection::crosstab(true, false);

        let mut editor = open(percent(PercentLevel::GrandTotal, true, false), rows_only);
        assert_eq!(
            editor.commit().percentage_option,
            Some(PercentageOption::RowGrandTotal)
        );

        let mut editor = open(percent(PercentLevel::SubTotal, true, false), rows_only);
        assert_eq!(editor.commit().percentage_option, Some(PercentageOption::RowGroup));

        let mut editor = open(percent(PercentLevel::SubTotal, false, true), rows_only);
        assert_eq!(editor.commit().percentage_option, Some(PercentageOption::None));

        let both = PercentDirection::crosstab(true, true);
        let mut editor = open(percent(PercentLevel::GrandTotal, false, true), both);
        assert_eq!(
            editor.commit().percentage_option,
            Some(PercentageOption::ColGrandTotal)
        );
    }

    #[test]
    fn test_regroup_drops_missing_break_by() {
        let mut editor = open(
            running_total("Sum", ResetLevel::Year, "Region"),
            PercentDirection::table(true),
        );
        let generation = editor.generation();

        let changed = editor.regroup(
            vec![GroupDimension::date("OrderDate", DateLevel::Month)],
            PercentDirection::table(true),
        );

        assert!(changed);
        assert!(editor.generation() > generation);
        let scope = editor.variant().reset_scope().unwrap();
        assert!(scope.break_by.is_none());
        assert_eq!(scope.reset_level, ResetLevel::Year);
    }

    #[test]
    fn test_commit_outcome_json() {
        let mut editor = open(moving("NthLargest(-1)", 1, 0), PercentDirection::default());
        let json = serde_json::to_string(&editor.commit()).unwrap();
        assert_snapshot!(json, @r#"{"variant":{"classType":"MOVING","aggregate":"NthLargest(1)","previous":1,"next":0,"includeCurrentValue":true,"nullIfNoEnoughValue":false,"innerDim":""},"nCoerced":true,"windowSize":2}"#);
    }
}
