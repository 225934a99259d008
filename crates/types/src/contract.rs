//! Contract ids and decoded contract instances.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use ledger_decode::{object, string, Decoder};
use serde_json::Value;

use crate::descriptor::{list, Descriptor, Serializable};
use crate::grammar::{with_policy, GrammarPolicy};
use crate::primitives::{Party, Text};
use crate::template::{Identifier, Template};

/// Id of a contract whose payload has type `T`.
///
/// On the wire this is a plain string. `T` keeps ids of different
/// templates apart at compile time and is never looked at at runtime.
pub struct ContractId<T> {
    id: String,
    _template: PhantomData<fn() -> T>,
}

impl<T> ContractId<T> {
    pub fn new(id: impl Into<String>) -> Self {
        ContractId {
            id: id.into(),
            _template: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }

    pub fn into_inner(self) -> String {
        self.id
    }
}

impl<T> Clone for ContractId<T> {
    fn clone(&self) -> Self {
        ContractId::new(self.id.clone())
    }
}

impl<T> PartialEq for ContractId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for ContractId<T> {}

impl<T> PartialOrd for ContractId<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for ContractId<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl<T> Hash for ContractId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for ContractId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContractId").field(&self.id).finish()
    }
}

impl<T> fmt::Display for ContractId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl<T: 'static> Serializable for ContractId<T> {
    fn decoder() -> Decoder<Self> {
        string().map(ContractId::new)
    }
}

// ── Contract ────────────────────────────────────────────────────────

/// A contract instance as returned by the ledger: payload plus metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Contract<T> {
    pub template_id: Identifier,
    pub contract_id: ContractId<T>,
    pub signatories: Vec<Party>,
    pub observers: Vec<Party>,
    pub agreement_text: Text,
    /// Contract key, passed through without validation.
    pub key: Value,
    pub argument: T,
    pub witness_parties: Vec<Party>,
    /// Present only when the ledger reported one.
    pub workflow_id: Option<String>,
}

/// The descriptor of contracts of `template`.
pub fn contract<T: 'static>(template: &Template<T>) -> Descriptor<Contract<T>> {
    contract_with(template.descriptor())
}

/// The descriptor of contracts whose payload is described by `argument`.
///
/// Every member except `workflowId` is required. `key` may hold any JSON
/// value, `null` included. `workflowId` is either absent or a string.
pub fn contract_with<T: 'static>(argument: &Descriptor<T>) -> Descriptor<Contract<T>> {
    contract_with_policy(argument, GrammarPolicy::Unchecked)
}

/// Like [`contract_with`], with party names in `signatories`, `observers`
/// and `witnessParties` decoded under `policy`.
///
/// Grammar violations are reported where they occur, in member order, so
/// a bad signatory is found before a missing `witnessParties`.
pub fn contract_with_policy<T: 'static>(
    argument: &Descriptor<T>,
    policy: GrammarPolicy,
) -> Descriptor<Contract<T>> {
    let argument = argument.clone();
    Descriptor::new(move || {
        let template_id = Identifier::decoder();
        let contract_id = ContractId::<T>::decoder();
        let parties = list(&with_policy::<Party>(policy)).decoder();
        let text = Text::decoder();
        let payload = argument.lazy_decoder();
        object(move |f| {
            Ok(Contract {
                template_id: f.required("templateId", &template_id)?,
                contract_id: f.required("contractId", &contract_id)?,
                signatories: f.required("signatories", &parties)?,
                observers: f.required("observers", &parties)?,
                agreement_text: f.required("agreementText", &text)?,
                key: f.raw("key")?.clone(),
                argument: f.required("argument", &payload)?,
                witness_parties: f.required("witnessParties", &parties)?,
                workflow_id: f.optional("workflowId", &text)?,
            })
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    struct Asset;

    fn id_template() -> Template<Text> {
        Template::new(Identifier::new("p", "M", "E"), Descriptor::of())
    }

    fn sample() -> Value {
        json!({
            "templateId": {"packageId": "p", "moduleName": "M", "entityName": "E"},
            "contractId": "#1",
            "signatories": ["Alice"],
            "observers": [],
            "agreementText": "",
            "key": null,
            "argument": "payload",
            "witnessParties": ["Alice"]
        })
    }

    #[test]
    fn test_contract_without_workflow_id() {
        let c = contract(&id_template()).decode(&sample()).unwrap();
        assert_eq!(c.template_id, Identifier::new("p", "M", "E"));
        assert_eq!(c.contract_id.as_str(), "#1");
        assert_eq!(c.signatories, vec![Party::from("Alice")]);
        assert!(c.observers.is_empty());
        assert_eq!(c.agreement_text, "");
        assert_eq!(c.key, Value::Null);
        assert_eq!(c.argument, "payload");
        assert_eq!(c.witness_parties, vec![Party::from("Alice")]);
        assert!(c.workflow_id.is_none());
    }

    #[test]
    fn test_contract_with_workflow_id() {
        let mut input = sample();
        input["workflowId"] = json!("wf-7");
        let c = contract(&id_template()).decode(&input).unwrap();
        assert_eq!(c.workflow_id.as_deref(), Some("wf-7"));
    }

    #[test]
    fn test_workflow_id_null_is_rejected() {
        let mut input = sample();
        input["workflowId"] = Value::Null;
        let err = contract(&id_template()).decode(&input).unwrap_err();
        assert_eq!(err.to_string(), "at $.workflowId: expected a string, got null");
    }

    #[test]
    fn test_missing_agreement_text() {
        let mut input = sample();
        input.as_object_mut().unwrap().remove("agreementText");
        let err = contract(&id_template()).decode(&input).unwrap_err();
        assert_eq!(
            err.message(),
            "the key 'agreementText' is required but was not present"
        );
    }

    #[test]
    fn test_missing_key_is_rejected_but_null_key_is_not() {
        let mut input = sample();
        input.as_object_mut().unwrap().remove("key");
        assert!(contract(&id_template()).decode(&input).is_err());

        let mut input = sample();
        input["key"] = json!({"owner": "Alice", "n": [1, 2]});
        let c = contract(&id_template()).decode(&input).unwrap();
        assert_eq!(c.key["owner"], "Alice");
    }

    #[test]
    fn test_first_failing_field_wins() {
        let mut input = sample();
        input["signatories"] = json!(["Alice", 3]);
        input["argument"] = json!(false);
        let err = contract(&id_template()).decode(&input).unwrap_err();
        assert_eq!(err.path().to_string(), "$.signatories[1]");
    }

    #[test]
    fn test_argument_error_is_located() {
        let mut input = sample();
        input["argument"] = json!(17);
        let err = contract(&id_template()).decode(&input).unwrap_err();
        assert_eq!(err.path().to_string(), "$.argument");
    }

    #[test]
    fn test_extra_members_are_ignored() {
        let mut input = sample();
        input["unexpected"] = json!(true);
        assert!(contract(&id_template()).decode(&input).is_ok());
    }

    #[test]
    fn test_enforced_parties_fail_in_member_order() {
        let mut input = sample();
        input["signatories"] = json!(["Bob!"]);
        input.as_object_mut().unwrap().remove("witnessParties");
        let strict = contract_with_policy(&Descriptor::<Text>::of(), GrammarPolicy::Enforced);
        let err = strict.decode(&input).unwrap_err();
        assert_eq!(err.path().to_string(), "$.signatories[0]");
        assert_eq!(
            err.message(),
            "'Bob!' is not a valid Party: expected letters, digits, spaces, ':', '_' or '-'"
        );

        let lenient = contract_with(&Descriptor::<Text>::of());
        let err = lenient.decode(&input).unwrap_err();
        assert_eq!(err.path().to_string(), "$");
    }

    #[test]
    fn test_enforced_parties_checked_in_every_list() {
        let strict = contract_with_policy(&Descriptor::<Text>::of(), GrammarPolicy::Enforced);
        assert!(strict.decode(&sample()).is_ok());

        let mut input = sample();
        input["witnessParties"] = json!(["Alice", "Eve?"]);
        let err = strict.decode(&input).unwrap_err();
        assert_eq!(err.path().to_string(), "$.witnessParties[1]");
    }

    #[test]
    fn test_contract_id_traits_without_bounds() {
        let a: ContractId<Asset> = ContractId::new("#1");
        let b = a.clone();
        assert_eq!(a, b);
        assert!(ContractId::<Asset>::new("#1") < ContractId::<Asset>::new("#2"));
        let set: HashSet<ContractId<Asset>> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_eq!(format!("{:?}", ContractId::<Asset>::new("#9")), "ContractId(\"#9\")");
        assert_eq!(ContractId::<Asset>::new("#9").to_string(), "#9");
    }
}
