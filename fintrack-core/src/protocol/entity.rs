//! Wire layout of the cached entities
//!
//! "Get all" responses are `TAG|count|` followed by `count` groups of
//! `ARITY` fields. A short response rejects the whole list.

use chrono::NaiveDate;

use crate::domain::result::{Error, Result};
use crate::domain::{
    Account, AccountDraft, Category, EntryKind, Transaction, TransactionDraft, DATE_FORMAT,
};

use super::codec::{Fields, Response};
use super::verbs;

/// An entity a store can load and decode from the wire
pub trait WireEntity: Clone + Send + Sync + 'static {
    /// Human-readable name used in logs and errors
    const NAME: &'static str;
    /// Command that fetches every entity of this type
    const LOAD_VERB: &'static str;
    /// Verb of the data response to `LOAD_VERB`
    const DATA_TAG: &'static str;
    /// Fields per entity in the data response
    const ARITY: usize;

    fn decode(fields: &mut Fields<'_>) -> Result<Self>;

    /// Order applied when building a snapshot; insertion order by default
    fn arrange(_items: &mut [Self]) {}
}

/// Decode a count-prefixed data response into a full list
pub fn decode_list<T: WireEntity>(response: &Response) -> Result<Vec<T>> {
    response.expect_verb(T::DATA_TAG)?;

    let mut fields = response.fields();
    let count = fields.next_count()?;
    let needed = count
        .checked_mul(T::ARITY)
        .ok_or_else(|| Error::protocol(format!("implausible {} count {}", T::NAME, count)))?;
    if fields.remaining() < needed {
        return Err(Error::protocol(format!(
            "truncated {} response: declared {} entries ({} fields), got {} fields",
            T::DATA_TAG,
            count,
            needed,
            fields.remaining()
        )));
    }

    let items = (0..count)
        .map(|_| T::decode(&mut fields))
        .collect::<Result<Vec<T>>>()?;

    if fields.remaining() > 0 {
        tracing::debug!(
            tag = T::DATA_TAG,
            extra = fields.remaining(),
            "ignoring trailing fields after declared entries"
        );
    }

    Ok(items)
}

impl WireEntity for Account {
    const NAME: &'static str = "account";
    const LOAD_VERB: &'static str = verbs::GET_ACCOUNTS;
    const DATA_TAG: &'static str = verbs::DATA_ACCOUNTS;
    const ARITY: usize = 5;

    fn decode(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(Account {
            id: fields.next_string("account id")?,
            name: fields.next_string("account name")?,
            number: fields.next_string("account number")?,
            balance: fields.next_i64("balance")?,
            account_type: fields.next_string("account type")?,
        })
    }
}

impl WireEntity for Transaction {
    const NAME: &'static str = "transaction";
    const LOAD_VERB: &'static str = verbs::GET_ALL;
    const DATA_TAG: &'static str = verbs::DATA_ALL;
    const ARITY: usize = 8;

    fn decode(fields: &mut Fields<'_>) -> Result<Self> {
        let id = fields.next_string("transaction id")?;
        let date = parse_date(fields.next_str("date")?)?;
        let description = fields.next_string("description")?;
        let category = fields.next_string("category")?;
        let kind = parse_kind(fields.next_str("transaction type")?)?;
        let amount = fields.next_i64("amount")?;
        Ok(Transaction {
            id,
            date,
            description,
            category,
            kind,
            amount,
            account_name: fields.next_string("account name")?,
            account_type: fields.next_string("account type")?,
        })
    }

    /// Newest first; equal dates keep server order
    fn arrange(items: &mut [Self]) {
        items.sort_by(|a, b| b.date.cmp(&a.date));
    }
}

impl WireEntity for Category {
    const NAME: &'static str = "category";
    const LOAD_VERB: &'static str = verbs::GET_CATEGORIES;
    const DATA_TAG: &'static str = verbs::DATA_CATEGORIES;
    const ARITY: usize = 2;

    fn decode(fields: &mut Fields<'_>) -> Result<Self> {
        let kind = parse_kind(fields.next_str("category type")?)?;
        Ok(Category::new(kind, fields.next_string("category name")?))
    }
}

/// `name|number|balance|type`, the order ADD_ACCOUNT and UPDATE_ACCOUNT expect
pub fn account_fields(draft: &AccountDraft) -> Vec<String> {
    vec![
        draft.name.clone(),
        draft.number.clone(),
        draft.balance.to_string(),
        draft.account_type.clone(),
    ]
}

/// `date|description|category|type|amount|account_name|account_type`
pub fn transaction_fields(draft: &TransactionDraft) -> Vec<String> {
    vec![
        draft.date.format(DATE_FORMAT).to_string(),
        draft.description.clone(),
        draft.category.clone(),
        draft.kind.as_str().to_string(),
        draft.amount.to_string(),
        draft.account_name.clone(),
        draft.account_type.clone(),
    ]
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| Error::protocol(format!("invalid date '{}'", raw)))
}

fn parse_kind(raw: &str) -> Result<EntryKind> {
    raw.parse::<EntryKind>().map_err(Error::protocol)
}
