#[cfg(test)]
mod tests {
    use aggcalc::formula::{
        decode, decode_with_report, FormulaId, FormulaParam, FormulaToken, NValue, CATALOG,
    };
    use aggcalc::model::PercentageOption;

    /// Every decoration a formula's flags allow, plus the bare token.
    fn decorated(formula: FormulaId) -> Vec<FormulaToken> {
        let descriptor = formula.descriptor();
        let mut bases = vec![FormulaToken::new(formula)];
        if descriptor.has_n {
            bases.push(FormulaToken::new(formula).with_n(NValue::Number(3)));
            bases.push(FormulaToken::new(formula).with_n(NValue::Dynamic("$(rank)".to_string())));
        }
        if descriptor.two_columns {
            bases.push(FormulaToken::new(formula).with_column("quantity"));
        }

        let mut tokens = Vec::new();
        for base in bases {
            tokens.push(base.clone());
            for option in PercentageOption::ALL {
                tokens.push(base.clone().with_percentage(option));
            }
        }
        tokens
    }

    #[test]
    fn test_round_trip_every_formula() {
        for formula in CATALOG.iter() {
            for token in decorated(formula.id) {
                let encoded = token.encode();
                let (decoded, report) = decode_with_report(&encoded);
                assert!(report.is_clean(), "{}: {:?}", encoded, report);
                assert_eq!(decoded, token, "{}", encoded);
                assert_eq!(decoded.encode(), encoded);
            }
        }
    }

    #[test]
    fn test_encode_examples() {
        let token = FormulaToken::new(FormulaId::Sum).with_percentage(PercentageOption::Group);
        assert_eq!(token.encode(), "Sum<1>");

        let token = FormulaToken::new(FormulaId::NthLargest)
            .with_percentage(PercentageOption::Group)
            .with_n(NValue::Number(3));
        assert_eq!(token.encode(), "NthLargest<1>(3)");

        let token = FormulaToken::new(FormulaId::Correlation).with_column("city");
        assert_eq!(token.encode(), "Correlation(city)");
    }

    #[test]
    fn test_encode_drops_param_the_formula_cannot_take() {
        let token = FormulaToken::new(FormulaId::Sum).with_n(NValue::Number(3));
        assert_eq!(token.encode(), "Sum");

        let token = FormulaToken::new(FormulaId::NthLargest).with_column("city");
        assert_eq!(token.encode(), "NthLargest");
    }

    #[test]
    fn test_empty_column_is_not_encoded() {
        let token = FormulaToken::new(FormulaId::Correlation).with_column("");
        assert!(token.param.is_none());
        assert_eq!(token.encode(), "Correlation");
        assert_eq!(decode(&token.encode()), token);

        let mut token = FormulaToken::new(FormulaId::Covariance);
        token.param = Some(FormulaParam::Column(String::new()));
        assert_eq!(token.encode(), "Covariance");
    }

    #[test]
    fn test_decode_without_decorations() {
        let token = decode("Average");
        assert_eq!(token.formula, FormulaId::Average);
        assert!(token.percentage.is_none());
        assert!(token.param.is_none());
    }

    #[test]
    fn test_dynamic_n_passes_through() {
        let token = decode("PthPercentile(=pct * 100)");
        assert_eq!(token.n(), Some(&NValue::Dynamic("=pct * 100".to_string())));
        assert_eq!(token.encode(), "PthPercentile(=pct * 100)");

        let token = decode("NthSmallest( $x)");
        assert_eq!(token.n(), Some(&NValue::Dynamic("$x".to_string())));

        let token = decode("NthLargest<2>($(top))");
        assert_eq!(token.percentage, Some(PercentageOption::GrandTotal));
        assert_eq!(token.n(), Some(&NValue::Dynamic("$(top)".to_string())));
    }

    #[test]
    fn test_unmatched_paren_leaves_n_unset() {
        let (token, report) = decode_with_report("NthLargest(3");
        assert_eq!(token.formula, FormulaId::NthLargest);
        assert!(token.n().is_none());
        assert!(report.malformed_param);
        assert!(!report.unknown_formula);
    }

    #[test]
    fn test_non_numeric_n_leaves_n_unset() {
        let (token, report) = decode_with_report("NthSmallest(abc)");
        assert_eq!(token.formula, FormulaId::NthSmallest);
        assert!(token.n().is_none());
        assert!(report.malformed_param);
    }

    #[test]
    fn test_param_on_formula_without_param_is_dropped() {
        let (token, report) = decode_with_report("Sum<1>(3)");
        assert_eq!(token.formula, FormulaId::Sum);
        assert_eq!(token.percentage, Some(PercentageOption::Group));
        assert!(token.param.is_none());
        assert!(report.malformed_param);
    }

    #[test]
    fn test_unknown_percentage_value() {
        let (token, report) = decode_with_report("Sum<3>");
        assert_eq!(token.formula, FormulaId::Sum);
        assert!(token.percentage.is_none());
        assert!(report.malformed_percentage);
    }

    #[test]
    fn test_column_name_with_brackets() {
        let token = decode("WeightedAverage(units<2024>)");
        assert_eq!(token.formula, FormulaId::WeightedAverage);
        assert_eq!(token.column(), Some("units<2024>"));
    }

    #[test]
    fn test_unknown_formula_decodes_to_none() {
        let (token, report) = decode_with_report("Geomean(3)");
        assert_eq!(token.formula, FormulaId::None);
        assert!(report.unknown_formula);
        assert!(token.param.is_none());
    }

    #[test]
    fn test_decode_accepts_aliases() {
        assert_eq!(decode("NTH_LARGEST(4)").n(), Some(&NValue::Number(4)));
        assert_eq!(decode("Weighted Average(units)").column(), Some("units"));
    }
}
