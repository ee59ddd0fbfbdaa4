//! Wire and domain models for the fund-tracking backend.
//!
//! Everything here is a plain serde model: the backend owns all state and is
//! the final authority on every transition. Roles are a closed enumeration
//! with a total privilege order rather than ad-hoc group-string matching, so
//! a typoed group tag can never silently grant or deny access.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Custody roles in ascending privilege order.
///
/// The derived `Ord` is load-bearing: `Student < Cr < Bp < Nsft`, and a holder
/// of a higher role may act in every lower role's area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    Student,
    #[serde(rename = "CR")]
    Cr,
    #[serde(rename = "BP")]
    Bp,
    #[serde(rename = "NSFT")]
    Nsft,
}

/// Role precedence consulted top-down when deciding where to send a caller
/// whose held roles don't include the one a view requires. Adding a tier is a
/// data change here, not a logic change elsewhere.
pub const ROLE_PRECEDENCE: [Role; 4] = [Role::Nsft, Role::Bp, Role::Cr, Role::Student];

impl Role {
    /// Parses a backend group tag. Matching is exact and case-sensitive;
    /// unknown tags yield `None` and the caller decides whether to warn.
    #[must_use]
    pub fn from_group(tag: &str) -> Option<Self> {
        match tag {
            "Student" => Some(Role::Student),
            "CR" => Some(Role::Cr),
            "BP" => Some(Role::Bp),
            "NSFT" => Some(Role::Nsft),
            _ => None,
        }
    }

    /// The backend group tag for this role.
    #[must_use]
    pub const fn group_tag(self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Cr => "CR",
            Role::Bp => "BP",
            Role::Nsft => "NSFT",
        }
    }
}

/// How money entered the fund. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionMode {
    Cash,
    Online,
}

/// Lifecycle of a cash transaction. Only ever advances forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashState {
    Initiated,
    Processing,
    Completed,
}

/// Review state of an online transaction. Leaves `Pending` exactly once and
/// is immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationState {
    Pending,
    Verified,
    Rejected,
}

/// The student a transaction is credited to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sender {
    pub name: String,
    /// Campus management system id.
    pub cms: String,
}

/// A unit of money movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    /// Positive amount in PKR.
    pub amount: f64,
    pub mode: TransactionMode,
    /// Present for cash transactions.
    #[serde(default)]
    pub state: Option<CashState>,
    /// Present for online transactions.
    #[serde(default)]
    pub verification_state: Option<VerificationState>,
    pub sender: Sender,
    pub created: DateTime<Utc>,
    /// Receipt image reference, online mode only.
    #[serde(default)]
    pub receipt: Option<String>,
    /// Reason recorded when an online transaction is rejected.
    #[serde(default)]
    pub rejection_details: Option<String>,
}

impl Transaction {
    /// True while a cash transaction has not yet been picked up by any
    /// handover batch. This is the only state in which it may be edited or
    /// deleted.
    #[must_use]
    pub fn is_unprocessed_cash(&self) -> bool {
        self.mode == TransactionMode::Cash && self.state == Some(CashState::Initiated)
    }

    /// True while an online transaction still awaits CR review.
    #[must_use]
    pub fn is_pending_online(&self) -> bool {
        self.mode == TransactionMode::Online
            && self.verification_state == Some(VerificationState::Pending)
    }
}

/// The user record embedded in representatives and token payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

impl UserInfo {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Student details carried inside the access token for student callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentInfo {
    pub id: i64,
    pub cms: i64,
    #[serde(default)]
    pub batch: Option<i64>,
    #[serde(default)]
    pub class_section: Option<String>,
    #[serde(default)]
    pub student_class: Option<String>,
    pub user: i64,
}

/// The user record nested in a representative directory entry, including the
/// group tags that determine which custody roles the user may act as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepresentativeUser {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub groups: Vec<String>,
}

/// A directory entry for a CR, BP, or NSFT role holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Representative {
    pub id: i64,
    #[serde(default)]
    pub cms: Option<String>,
    pub user: RepresentativeUser,
}

impl Representative {
    /// The custody roles this representative may act as. Unknown group tags
    /// are dropped with a warning rather than failing the whole directory.
    #[must_use]
    pub fn roles(&self) -> Vec<Role> {
        self.user
            .groups
            .iter()
            .filter_map(|tag| {
                let role = Role::from_group(tag);
                if role.is_none() {
                    tracing::warn!(group = %tag, representative = self.id, "unknown group tag");
                }
                role
            })
            .collect()
    }

    /// Exact, case-sensitive group-tag membership check.
    #[must_use]
    pub fn holds_role(&self, role: Role) -> bool {
        self.user.groups.iter().any(|tag| tag == role.group_tag())
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.user.first_name, self.user.last_name)
    }
}

/// One custody hand-off: a batch of transactions forwarded from one
/// representative to the next custodian in the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedTransaction {
    pub id: i64,
    pub forwarder: Representative,
    pub forwardee_id: i64,
    /// Sum of the constituent transaction amounts at batching time.
    pub forwarded_amount: f64,
    /// The original transactions this batch carries, flattened across hops.
    pub transactions: Vec<Transaction>,
    pub is_verified_by_forwardee: bool,
    /// Set once the forwardee has itself forwarded this batch onward, at
    /// which point it leaves the forwardee's pending-handover view.
    pub is_forwarded: bool,
    pub created: DateTime<Utc>,
}

/// Fund request status across both approval gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Granted,
}

/// Bank transfer coordinates supplied by the requesting student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankDetails {
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
    pub contact_number: String,
}

/// A student's ask for disbursement, gated first by NSFT and then by the
/// accountant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundRequest {
    pub id: i64,
    pub student_name: String,
    pub cms: String,
    pub amount: f64,
    pub reason: String,
    pub bank_details: BankDetails,
    pub request_date: NaiveDate,
    pub status: RequestStatus,
    pub approved_by_nsft: bool,
    /// NSFT-stage notes: approval comments or the rejection reason.
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub granted_amount: Option<f64>,
    #[serde(default)]
    pub transfer_details: Option<String>,
    #[serde(default)]
    pub granted_date: Option<NaiveDate>,
    /// Accountant-stage rejection reason, distinct from NSFT comments.
    #[serde(default)]
    pub rejection_reason: Option<String>,
    /// `"accountant"` when the rejection happened after NSFT approval.
    #[serde(default)]
    pub rejected_by: Option<String>,
    #[serde(default)]
    pub rejected_date: Option<NaiveDate>,
}

impl FundRequest {
    /// True once the request has cleared the NSFT gate and still awaits the
    /// accountant's decision.
    #[must_use]
    pub fn awaits_accountant(&self) -> bool {
        self.approved_by_nsft && self.status == RequestStatus::Approved
    }
}

/// Claims embedded in the backend's access token. The `user_type` claim is a
/// single role tag or a list of them on the wire; it is normalized to a list
/// here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPayload {
    #[serde(default)]
    pub token_type: String,
    /// Expiry as seconds since the Unix epoch.
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
    pub user_id: i64,
    #[serde(deserialize_with = "one_or_many")]
    pub user_type: Vec<String>,
    pub user: UserInfo,
    #[serde(default)]
    pub student: Option<StudentInfo>,
}

impl TokenPayload {
    /// True while the token's expiry lies in the future.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.exp > now.timestamp()
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(role) => vec![role],
        OneOrMany::Many(roles) => roles,
    })
}
