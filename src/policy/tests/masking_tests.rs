//! Unit tests for payload masking.

use crate::policy::finance::FinancePolicyPack;
use crate::policy::ports::PolicyPack;
use crate::policy::{PayloadMasker, masking::DEFAULT_MASK_TOKEN};
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn masker() -> PayloadMasker {
    PayloadMasker::new(FinancePolicyPack::default().masking_rules(), DEFAULT_MASK_TOKEN)
}

#[rstest]
fn masked_keys_match_case_insensitively_at_any_depth(masker: PayloadMasker) {
    let masked = masker.mask(&json!({
        "customer": {"SSN": "111-22-3333", "name": "Ada"},
        "accounts": [{"Account_Number": "12345678"}],
    }));

    assert_eq!(
        masked,
        json!({
            "customer": {"SSN": DEFAULT_MASK_TOKEN, "name": "Ada"},
            "accounts": [{"Account_Number": DEFAULT_MASK_TOKEN}],
        })
    );
}

#[rstest]
fn value_patterns_mask_free_text(masker: PayloadMasker) {
    let masked = masker.mask(&json!({
        "note": "ssn 111-22-3333 on file",
        "memo": "card 4111 1111 1111 1111 declined",
    }));

    assert_eq!(
        masked,
        json!({
            "note": "ssn ***-**-**** on file",
            "memo": "card ****-****-****-**** declined",
        })
    );
}

#[rstest]
fn non_string_scalars_are_untouched(masker: PayloadMasker) {
    let payload = json!({"amount": 123_456_789, "ok": true, "none": null});
    assert_eq!(masker.mask(&payload), payload);
}

#[rstest]
fn metadata_maps_are_masked(masker: PayloadMasker) {
    let metadata = json!({"token": "abc", "initiator": "desk"})
        .as_object()
        .cloned()
        .expect("object");

    let masked = masker.mask_map(&metadata);

    assert_eq!(masked.get("token"), Some(&json!(DEFAULT_MASK_TOKEN)));
    assert_eq!(masked.get("initiator"), Some(&json!("desk")));
}

#[rstest]
#[case("passwd")]
#[case("apikey")]
#[case("api-key")]
#[case("Access-Key")]
#[case("secret_key")]
fn credential_key_variants_are_masked(masker: PayloadMasker, #[case] key: &str) {
    let masked = masker.mask(&json!({ key: "hunter2" }));
    assert_eq!(masked, json!({ key: DEFAULT_MASK_TOKEN }));
}

#[rstest]
fn long_digit_runs_under_account_keys_are_masked(masker: PayloadMasker) {
    let masked = masker.mask(&json!({
        "account_id": "99887766",
        "checking_account": "12345678901",
        "savings_account": 123_456_789,
        "account_nickname": "rainy day",
        "reference": "12345678901",
    }));

    assert_eq!(
        masked,
        json!({
            "account_id": "********",
            "checking_account": "********",
            "savings_account": "********",
            "account_nickname": "rainy day",
            "reference": "12345678901",
        })
    );
}
