#[cfg(test)]
mod tests {
    use aggcalc::binding::{AggregateBinding, BindingRules, FormulaControls};
    use aggcalc::config::CalcDefaults;
    use aggcalc::formula::FormulaId;
    use aggcalc::model::{ColumnRef, DataType, PercentageOption};

    fn sales() -> ColumnRef {
        ColumnRef::new("sales", DataType::Decimal)
    }

    fn available() -> Vec<ColumnRef> {
        vec![
            ColumnRef::new("city", DataType::String),
            ColumnRef::new("quantity", DataType::Int),
            ColumnRef::new("discount", DataType::Float),
        ]
    }

    fn binding_with(token: &str) -> AggregateBinding {
        AggregateBinding::from_token(sales(), token)
    }

    #[test]
    fn test_new_binding_defaults() {
        let rules = BindingRules::default();
        assert_eq!(rules.new_binding(sales()).base_formula, "Sum");
        assert_eq!(
            rules
                .new_binding(ColumnRef::new("city", DataType::String))
                .base_formula,
            "Count"
        );
        assert_eq!(
            rules
                .new_binding(ColumnRef::cube("city", DataType::String))
                .base_formula,
            "Sum"
        );
    }

    #[test]
    fn test_default_formula_set_starts_with_none() {
        let rules = BindingRules::default();
        let set = rules.default_formula_set(DataType::Bool, false);
        assert_eq!(set[0].id, FormulaId::None);
        assert_eq!(set.len(), 6);
    }

    #[test]
    fn test_n_defaults_to_one() {
        let rules = BindingRules::default();
        let mut binding = rules.new_binding(sales());

        rules.on_formula_changed(&mut binding, "NthLargest", &available());

        assert_eq!(binding.base_formula, "NthLargest");
        assert_eq!(binding.num_value.as_deref(), Some("1"));
        assert!(binding.secondary_column.is_none());
        assert_eq!(binding.to_token(), "NthLargest(1)");
    }

    #[test]
    fn test_configured_default_n() {
        let rules = BindingRules::new(CalcDefaults {
            default_n: "5".to_string(),
            ..CalcDefaults::default()
        });
        let mut binding = rules.new_binding(sales());
        rules.on_formula_changed(&mut binding, "PthPercentile", &available());
        assert_eq!(binding.num_value.as_deref(), Some("5"));
    }

    #[test]
    fn test_existing_n_is_kept() {
        let rules = BindingRules::default();
        let mut binding = binding_with("NthLargest(3)");
        rules.on_formula_changed(&mut binding, "NthSmallest", &available());
        assert_eq!(binding.num_value.as_deref(), Some("3"));
    }

    #[test]
    fn test_n_embedded_in_token_wins() {
        let rules = BindingRules::default();
        let mut binding = binding_with("NthLargest(3)");
        rules.on_formula_changed(&mut binding, "NthSmallest($(rank))", &available());
        assert_eq!(binding.num_value.as_deref(), Some("$(rank)"));
    }

    #[test]
    fn test_numeric_secondary_skips_string_columns() {
        let rules = BindingRules::default();
        let mut binding = rules.new_binding(sales());

        rules.on_formula_changed(&mut binding, "WeightedAverage", &available());
        assert_eq!(binding.secondary_column.as_deref(), Some("quantity"));
    }

    #[test]
    fn test_first_accepts_any_column() {
        let rules = BindingRules::default();
        let mut binding = rules.new_binding(sales());

        rules.on_formula_changed(&mut binding, "First", &available());
        assert_eq!(binding.secondary_column.as_deref(), Some("city"));
    }

    #[test]
    fn test_incompatible_secondary_is_replaced() {
        let rules = BindingRules::default();
        let mut binding = binding_with("Last(city)");

        rules.on_formula_changed(&mut binding, "Covariance", &available());
        assert_eq!(binding.secondary_column.as_deref(), Some("quantity"));

        rules.on_formula_changed(&mut binding, "Correlation", &available());
        assert_eq!(binding.secondary_column.as_deref(), Some("quantity"));
    }

    #[test]
    fn test_no_compatible_column() {
        let rules = BindingRules::default();
        let mut binding = rules.new_binding(sales());
        let only_text = vec![ColumnRef::new("city", DataType::String)];

        rules.on_formula_changed(&mut binding, "Correlation", &only_text);
        assert!(binding.secondary_column.is_none());
        assert_eq!(binding.to_token(), "Correlation");
    }

    #[test]
    fn test_plain_formula_clears_parameters() {
        let rules = BindingRules::default();
        let mut binding = binding_with("Correlation(quantity)");
        binding.num_value = Some("2".to_string());

        rules.on_formula_changed(&mut binding, "Median", &available());
        assert!(binding.secondary_column.is_none());
        assert!(binding.num_value.is_none());
    }

    #[test]
    fn test_formula_change_drops_ineligible_percentage() {
        let rules = BindingRules::default();
        let mut binding = binding_with("Sum<1>");
        assert_eq!(binding.percentage_option, PercentageOption::Group);

        rules.on_formula_changed(&mut binding, "Average", &available());
        assert_eq!(binding.percentage_option, PercentageOption::Group);

        rules.on_formula_changed(&mut binding, "NthLargest", &available());
        assert_eq!(binding.percentage_option, PercentageOption::None);
    }

    #[test]
    fn test_percentage_eligibility_classes() {
        let rules = BindingRules::default();

        assert!(rules.is_percentage_eligible(&binding_with("Sum"), 0));
        assert!(rules.is_percentage_eligible(&binding_with("None"), 0));

        assert!(!rules.is_percentage_eligible(&binding_with("Correlation(quantity)"), 0));
        assert!(!rules.is_percentage_eligible(&binding_with("Correlation(quantity)"), 3));

        assert!(!rules.is_percentage_eligible(&binding_with("First(city)"), 0));
        assert!(rules.is_percentage_eligible(&binding_with("First(city)"), 1));

        assert!(!rules.is_percentage_eligible(&binding_with("PthPercentile(90)"), 2));
        assert!(!rules.is_percentage_eligible(&binding_with("SumSQ"), 2));

        assert!(rules.is_percentage_eligible(&binding_with("DistinctCount"), 0));
        assert!(rules.is_percentage_eligible(&binding_with("PopulationVariance"), 0));
    }

    #[test]
    fn test_controls() {
        let rules = BindingRules::default();
        assert_eq!(
            rules.controls(&binding_with("NthLargest(2)"), 1),
            FormulaControls {
                n: true,
                secondary_column: false,
                percentage: false,
            }
        );
        assert_eq!(
            rules.controls(&binding_with("Last(city)"), 1),
            FormulaControls {
                n: false,
                secondary_column: true,
                percentage: true,
            }
        );
    }
}
