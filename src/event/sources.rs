//! Batch event sources and their result envelopes.

use serde_json::{json, Value};

/// Where a batch invocation came from. Decides record extraction and the
/// shape of the aggregate result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchSource {
    /// `{"records": [{"id", "body"}]}`
    Generic,
    /// Queue records: `Records[].messageId` / `body`.
    Sqs,
    /// Notification records: `Records[].Sns.MessageId` / `Sns.Message`.
    Sns,
    /// Broker messages: `messages[].messageId` / `data`.
    Mq,
    /// `Records: []`
    Empty,
}

impl BatchSource {
    /// Map an `eventSource` tag.
    pub fn from_event_source(tag: &str) -> Option<Self> {
        match tag {
            "aws:sqs" => Some(Self::Sqs),
            "aws:sns" => Some(Self::Sns),
            "aws:mq" => Some(Self::Mq),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Sqs => "sqs",
            Self::Sns => "sns",
            Self::Mq => "mq",
            Self::Empty => "empty",
        }
    }

    /// `(id, payload)` of one record, if the fields are present.
    pub(crate) fn extract<'a>(&self, record: &'a Value) -> Option<(String, &'a Value)> {
        let (id, payload) = match self {
            Self::Generic => (record.get("id")?, record.get("body")?),
            Self::Sqs => (record.get("messageId")?, record.get("body")?),
            Self::Sns => {
                let sns = record.get("Sns")?;
                let id = sns.get("MessageId").or_else(|| record.get("messageId"))?;
                (id, sns.get("Message")?)
            }
            Self::Mq => (record.get("messageId")?, record.get("data")?),
            Self::Empty => return None,
        };

        let id = match id {
            Value::String(id) => id.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        Some((id, payload))
    }

    /// Aggregate result for the host, given the failed record ids.
    ///
    /// Only the generic and queue sources read the result; the others get
    /// `null`.
    pub fn aggregate(&self, failed: &[String]) -> Value {
        match self {
            Self::Generic => json!({ "failedRecordIds": failed }),
            Self::Sqs if failed.is_empty() => Value::Null,
            Self::Sqs => {
                let items: Vec<Value> = failed.iter().map(|id| json!({ "itemIdentifier": id })).collect();
                json!({ "batchItemFailures": items })
            }
            Self::Sns | Self::Mq | Self::Empty => Value::Null,
        }
    }
}
