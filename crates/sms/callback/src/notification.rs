//! Notification kinds and their decoded records.
//!
//! Every record keeps the `data` string it was decoded from. Typed fields are
//! extracted alongside it; serializing a record emits that original JSON.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;
use std::fmt;
use std::str::FromStr;

use crate::decode::Fields;
use crate::error::{CallbackError, DecodeError};

/// The four notification types the vendor sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// An end user replied to a message (`SMS_REPLY`).
    Reply,
    /// Delivery report for a sent message (`SMS_REPORT`).
    Report,
    /// Review result for a message template (`SMS_TEMPLATE`).
    TemplateAudit,
    /// Review result for a sender signature (`SMS_SIGN`).
    SignatureAudit,
}

impl NotificationKind {
    /// All kinds, in wire order.
    pub const ALL: [NotificationKind; 4] = [
        NotificationKind::Reply,
        NotificationKind::Report,
        NotificationKind::TemplateAudit,
        NotificationKind::SignatureAudit,
    ];

    /// Returns the wire tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Reply => "SMS_REPLY",
            NotificationKind::Report => "SMS_REPORT",
            NotificationKind::TemplateAudit => "SMS_TEMPLATE",
            NotificationKind::SignatureAudit => "SMS_SIGN",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = CallbackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SMS_REPLY" => Ok(NotificationKind::Reply),
            "SMS_REPORT" => Ok(NotificationKind::Report),
            "SMS_TEMPLATE" => Ok(NotificationKind::TemplateAudit),
            "SMS_SIGN" => Ok(NotificationKind::SignatureAudit),
            other => Err(CallbackError::UnsupportedType {
                tag: other.to_string(),
            }),
        }
    }
}

/// An inbound reply to a sent message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyNotification {
    /// Phone number that replied.
    pub phone: String,
    /// When the reply was received by the vendor.
    pub reply_time: Option<DateTime<Utc>>,
    /// Reply text.
    pub content: String,
    raw: String,
}

impl ReplyNotification {
    /// Decodes an `SMS_REPLY` payload.
    pub fn decode(data: &str) -> Result<Self, DecodeError> {
        let fields = Fields::parse(NotificationKind::Reply, data)?;
        Ok(Self {
            phone: fields.required_text("phone")?,
            reply_time: fields.timestamp("replyTime")?,
            content: fields.text("content")?.unwrap_or_default(),
            raw: data.to_string(),
        })
    }

    /// The payload exactly as received.
    pub fn raw_json(&self) -> &str {
        &self.raw
    }
}

/// A delivery report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportNotification {
    /// Vendor message id; `None` when the vendor sent a "no value" marker.
    pub msg_id: Option<String>,
    /// Delivery status code.
    pub status: i64,
    /// Destination phone number.
    pub phone: Option<String>,
    /// When the handset received the message.
    pub receive_time: Option<DateTime<Utc>>,
    /// Carrier error code for failed deliveries.
    pub error_code: Option<String>,
    raw: String,
}

impl ReportNotification {
    /// Decodes an `SMS_REPORT` payload.
    pub fn decode(data: &str) -> Result<Self, DecodeError> {
        let fields = Fields::parse(NotificationKind::Report, data)?;
        Ok(Self {
            msg_id: fields.identifier("msgId")?,
            status: fields.required_integer("status")?,
            phone: fields.text("phone")?,
            receive_time: fields.timestamp("receiveTime")?,
            error_code: fields.identifier("errorCode")?,
            raw: data.to_string(),
        })
    }

    /// The payload exactly as received.
    pub fn raw_json(&self) -> &str {
        &self.raw
    }
}

/// Review result for a message template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateAuditNotification {
    pub template_id: i64,
    pub status: i64,
    /// Rejection reason, when rejected.
    pub reason: Option<String>,
    raw: String,
}

impl TemplateAuditNotification {
    /// Decodes an `SMS_TEMPLATE` payload.
    pub fn decode(data: &str) -> Result<Self, DecodeError> {
        let fields = Fields::parse(NotificationKind::TemplateAudit, data)?;
        Ok(Self {
            template_id: fields.required_numeric_id("templateId")?,
            status: fields.required_integer("status")?,
            reason: fields.text("reason")?,
            raw: data.to_string(),
        })
    }

    /// The payload exactly as received.
    pub fn raw_json(&self) -> &str {
        &self.raw
    }
}

/// Review result for a sender signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureAuditNotification {
    pub sign_id: i64,
    pub status: i64,
    /// Rejection reason, when rejected.
    pub reason: Option<String>,
    raw: String,
}

impl SignatureAuditNotification {
    /// Decodes an `SMS_SIGN` payload.
    pub fn decode(data: &str) -> Result<Self, DecodeError> {
        let fields = Fields::parse(NotificationKind::SignatureAudit, data)?;
        Ok(Self {
            sign_id: fields.required_numeric_id("signId")?,
            status: fields.required_integer("status")?,
            reason: fields.text("reason")?,
            raw: data.to_string(),
        })
    }

    /// The payload exactly as received.
    pub fn raw_json(&self) -> &str {
        &self.raw
    }
}

/// A decoded notification of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Notification {
    Reply(ReplyNotification),
    Report(ReportNotification),
    TemplateAudit(TemplateAuditNotification),
    SignatureAudit(SignatureAuditNotification),
}

impl Notification {
    /// Decodes `data` as the given kind.
    pub fn decode(kind: NotificationKind, data: &str) -> Result<Self, DecodeError> {
        Ok(match kind {
            NotificationKind::Reply => Self::Reply(ReplyNotification::decode(data)?),
            NotificationKind::Report => Self::Report(ReportNotification::decode(data)?),
            NotificationKind::TemplateAudit => {
                Self::TemplateAudit(TemplateAuditNotification::decode(data)?)
            }
            NotificationKind::SignatureAudit => {
                Self::SignatureAudit(SignatureAuditNotification::decode(data)?)
            }
        })
    }

    /// Returns the kind of this notification.
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::Reply(_) => NotificationKind::Reply,
            Self::Report(_) => NotificationKind::Report,
            Self::TemplateAudit(_) => NotificationKind::TemplateAudit,
            Self::SignatureAudit(_) => NotificationKind::SignatureAudit,
        }
    }

    /// The payload exactly as received.
    pub fn raw_json(&self) -> &str {
        match self {
            Self::Reply(n) => n.raw_json(),
            Self::Report(n) => n.raw_json(),
            Self::TemplateAudit(n) => n.raw_json(),
            Self::SignatureAudit(n) => n.raw_json(),
        }
    }
}

/// A decoded record of one specific kind.
pub trait DecodedNotification: fmt::Debug + Send + Sync + Sized + 'static {
    /// The kind this record decodes.
    const KIND: NotificationKind;

    /// Decodes a `data` payload.
    fn decode(data: &str) -> Result<Self, DecodeError>;

    /// The payload exactly as received.
    fn raw_json(&self) -> &str;
}

macro_rules! decoded_notification {
    ($($ty:ident => $kind:ident),*) => {
        $(
            impl DecodedNotification for $ty {
                const KIND: NotificationKind = NotificationKind::$kind;

                fn decode(data: &str) -> Result<Self, DecodeError> {
                    $ty::decode(data)
                }

                fn raw_json(&self) -> &str {
                    &self.raw
                }
            }

            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serialize_raw(&self.raw, serializer)
                }
            }
        )*
    };
}

decoded_notification!(
    ReplyNotification => Reply,
    ReportNotification => Report,
    TemplateAuditNotification => TemplateAudit,
    SignatureAuditNotification => SignatureAudit
);

/// Emits the stored payload verbatim, minus leading and trailing whitespace.
///
/// Use `raw_json()` when the exact received bytes are needed.
fn serialize_raw<S: Serializer>(raw: &str, serializer: S) -> Result<S::Ok, S::Error> {
    let value = RawValue::from_string(raw.to_string()).map_err(serde::ser::Error::custom)?;
    value.serialize(serializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_kind_wire_mapping() {
        for kind in NotificationKind::ALL {
            assert_eq!(kind.as_str().parse::<NotificationKind>().unwrap(), kind);
        }
        let err = "SMS_UNKNOWN".parse::<NotificationKind>().unwrap_err();
        assert!(matches!(err, CallbackError::UnsupportedType { tag } if tag == "SMS_UNKNOWN"));
        assert!("sms_reply".parse::<NotificationKind>().is_err());
    }

    #[test]
    fn test_decode_report() {
        let data = r#"{"msgId":"m1","status":0,"phone":"+15550100","receiveTime":"2023-01-02 03:04:05.5"}"#;
        let report = ReportNotification::decode(data).unwrap();

        let expected = NaiveDate::from_ymd_opt(2023, 1, 2)
            .unwrap()
            .and_hms_micro_opt(3, 4, 5, 500_000)
            .unwrap()
            .and_utc();
        assert_eq!(report.msg_id.as_deref(), Some("m1"));
        assert_eq!(report.status, 0);
        assert_eq!(report.phone.as_deref(), Some("+15550100"));
        assert_eq!(report.receive_time, Some(expected));
        assert_eq!(report.error_code, None);
    }

    #[test]
    fn test_report_msg_id_encodings_agree() {
        let as_string = ReportNotification::decode(r#"{"msgId":"123","status":1}"#).unwrap();
        let as_number = ReportNotification::decode(r#"{"msgId":123,"status":1}"#).unwrap();
        let as_zero = ReportNotification::decode(r#"{"msgId":0,"status":1}"#).unwrap();

        assert_eq!(as_string.msg_id.as_deref(), Some("123"));
        assert_eq!(as_string.msg_id, as_number.msg_id);
        assert_eq!(as_zero.msg_id, None);
    }

    #[test]
    fn test_report_error_code_and_millis() {
        let report = ReportNotification::decode(
            r#"{"msgId":9,"status":"2","errorCode":4001,"receiveTime":1672628645500}"#,
        )
        .unwrap();
        assert_eq!(report.status, 2);
        assert_eq!(report.error_code.as_deref(), Some("4001"));
        assert_eq!(
            report.receive_time.unwrap().to_rfc3339(),
            "2023-01-02T03:04:05.500+00:00"
        );
    }

    #[test]
    fn test_report_requires_status() {
        let err = ReportNotification::decode(r#"{"msgId":"m1"}"#).unwrap_err();
        assert_eq!(err.kind, NotificationKind::Report);
        assert_eq!(err.raw, r#"{"msgId":"m1"}"#);
    }

    #[test]
    fn test_report_rejects_malformed_identifier() {
        assert!(ReportNotification::decode(r#"{"msgId":{"x":1},"status":0}"#).is_err());
        assert!(
            ReportNotification::decode(r#"{"msgId":"m1","status":0,"receiveTime":"later"}"#)
                .is_err()
        );
    }

    #[test]
    fn test_decode_reply() {
        let reply = ReplyNotification::decode(
            r#"{"phone":"+15550100","content":"STOP","replyTime":"Mon Jan 02 03:04:05 CST 2023"}"#,
        )
        .unwrap();
        assert_eq!(reply.phone, "+15550100");
        assert_eq!(reply.content, "STOP");
        assert!(reply.reply_time.is_some());

        assert!(ReplyNotification::decode(r#"{"content":"hi"}"#).is_err());
    }

    #[test]
    fn test_decode_audits() {
        let template =
            TemplateAuditNotification::decode(r#"{"templateId":"1001","status":2,"reason":"spam"}"#)
                .unwrap();
        assert_eq!(template.template_id, 1001);
        assert_eq!(template.status, 2);
        assert_eq!(template.reason.as_deref(), Some("spam"));

        let sign = SignatureAuditNotification::decode(r#"{"signId":77,"status":1}"#).unwrap();
        assert_eq!(sign.sign_id, 77);
        assert_eq!(sign.reason, None);

        assert!(SignatureAuditNotification::decode(r#"{"signId":0,"status":1}"#).is_err());
        assert!(TemplateAuditNotification::decode(r#"{"templateId":"abc","status":1}"#).is_err());
    }

    #[test]
    fn test_raw_json_round_trip() {
        let payloads = [
            (NotificationKind::Reply, r#"{"phone": 15550100, "content":"hi", "extra":[1,2]}"#),
            (NotificationKind::Report, r#"{"msgId":123,"status":0,"unknownField":{"a":null}}"#),
            (NotificationKind::TemplateAudit, r#"{ "templateId" : "5", "status" : 1 }"#),
            (NotificationKind::SignatureAudit, r#"{"signId":6,"status":"0","reason":"ok"}"#),
        ];

        for (kind, data) in payloads {
            let notification = Notification::decode(kind, data).unwrap();
            assert_eq!(notification.kind(), kind);
            assert_eq!(notification.raw_json(), data);
            assert_eq!(serde_json::to_string(&notification).unwrap(), data);
        }
    }

    #[test]
    fn test_padded_payload_keeps_raw_bytes() {
        let data = " {\"signId\":6, \"status\":0}\n";
        let notification = Notification::decode(NotificationKind::SignatureAudit, data).unwrap();

        assert_eq!(notification.raw_json(), data);
        assert_eq!(
            serde_json::to_string(&notification).unwrap(),
            "{\"signId\":6, \"status\":0}"
        );
    }
}
