//! Property tests for policy number classification

use proptest::prelude::*;

use domain_claims::policy_number::{classify, InsuranceCompany, INVALID_FORMAT_MESSAGE};
use test_utils::{
    hdfc_ergo_policy_number_strategy, icici_lombard_policy_number_strategy,
    lic_policy_number_strategy, muthoot_policy_number_strategy, policy_number_strategy,
    star_health_policy_number_strategy,
};

#[test]
fn test_reference_numbers() {
    let cases = [
        ("123456789", Some(InsuranceCompany::Lic)),
        ("1234567890", Some(InsuranceCompany::HdfcErgo)),
        ("MHI-2025-009876", Some(InsuranceCompany::MuthootHealth)),
        ("P/141113/01/2025/012345", Some(InsuranceCompany::StarHealth)),
        ("ABCDE123456", Some(InsuranceCompany::IciciLombard)),
        ("12345678", None),
        ("MHI-25-009876", None),
        ("12345678901", None),
    ];
    for (raw, expected) in cases {
        let result = classify(raw);
        assert_eq!(result.company, expected, "{}", raw);
        assert_eq!(result.valid, expected.is_some(), "{}", raw);
    }
}

#[test]
fn test_classification_serializes_company_display_name() {
    let json = serde_json::to_value(classify("MHI-2025-009876")).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "company": "Muthoot Health Insurance", "valid": true })
    );

    let json = serde_json::to_value(classify("nope")).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "company": null, "valid": false, "error": INVALID_FORMAT_MESSAGE })
    );
}

proptest! {
    #[test]
    fn prop_generated_numbers_classify_as_their_insurer((policy, company) in policy_number_strategy()) {
        let result = classify(&policy);
        prop_assert!(result.valid);
        prop_assert_eq!(result.company, Some(company));
        prop_assert!(result.error.is_none());
    }

    #[test]
    fn prop_nine_digits_are_lic(policy in lic_policy_number_strategy()) {
        prop_assert_eq!(classify(&policy).company, Some(InsuranceCompany::Lic));
    }

    #[test]
    fn prop_ten_digits_are_hdfc_ergo(policy in hdfc_ergo_policy_number_strategy()) {
        prop_assert_eq!(classify(&policy).company, Some(InsuranceCompany::HdfcErgo));
    }

    #[test]
    fn prop_muthoot_prefix_is_case_insensitive(policy in muthoot_policy_number_strategy()) {
        prop_assert_eq!(
            classify(&policy.to_lowercase()).company,
            Some(InsuranceCompany::MuthootHealth)
        );
    }

    #[test]
    fn prop_star_health_format(policy in star_health_policy_number_strategy()) {
        prop_assert_eq!(classify(&policy).company, Some(InsuranceCompany::StarHealth));
    }

    #[test]
    fn prop_long_mixed_alphanumerics_are_icici(policy in icici_lombard_policy_number_strategy()) {
        prop_assert_eq!(classify(&policy).company, Some(InsuranceCompany::IciciLombard));
    }

    #[test]
    fn prop_eleven_or_more_digits_alone_are_invalid(policy in "[0-9]{11,16}") {
        prop_assert!(!classify(&policy).valid);
    }

    #[test]
    fn prop_surrounding_whitespace_is_ignored((policy, _) in policy_number_strategy(), pad in "[ \t]{0,3}") {
        let padded = format!("{}{}{}", pad, policy, pad);
        prop_assert_eq!(classify(&padded), classify(&policy));
    }

    #[test]
    fn prop_classification_is_total_and_consistent(raw in ".*") {
        let result = classify(&raw);
        prop_assert_eq!(result.valid, result.company.is_some());
        if raw.trim().is_empty() {
            prop_assert!(result.error.is_none());
        } else {
            prop_assert_eq!(result.error.is_some(), !result.valid);
        }
    }
}
