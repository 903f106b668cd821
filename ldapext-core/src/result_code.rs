//! LDAP result codes (RFC 4511 Appendix A plus client-side codes)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric LDAP result code
///
/// Kept as an open newtype rather than a closed enum: servers are free to
/// return codes this crate has no name for, and those must survive a
/// decode/encode cycle untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultCode(i32);

impl ResultCode {
    pub const SUCCESS: ResultCode = ResultCode(0);
    pub const OPERATIONS_ERROR: ResultCode = ResultCode(1);
    pub const PROTOCOL_ERROR: ResultCode = ResultCode(2);
    pub const TIME_LIMIT_EXCEEDED: ResultCode = ResultCode(3);
    pub const SIZE_LIMIT_EXCEEDED: ResultCode = ResultCode(4);
    pub const COMPARE_FALSE: ResultCode = ResultCode(5);
    pub const COMPARE_TRUE: ResultCode = ResultCode(6);
    pub const AUTH_METHOD_NOT_SUPPORTED: ResultCode = ResultCode(7);
    pub const STRONG_AUTH_REQUIRED: ResultCode = ResultCode(8);
    pub const REFERRAL: ResultCode = ResultCode(10);
    pub const ADMIN_LIMIT_EXCEEDED: ResultCode = ResultCode(11);
    pub const UNAVAILABLE_CRITICAL_EXTENSION: ResultCode = ResultCode(12);
    pub const CONFIDENTIALITY_REQUIRED: ResultCode = ResultCode(13);
    pub const SASL_BIND_IN_PROGRESS: ResultCode = ResultCode(14);
    pub const NO_SUCH_ATTRIBUTE: ResultCode = ResultCode(16);
    pub const UNDEFINED_ATTRIBUTE_TYPE: ResultCode = ResultCode(17);
    pub const INAPPROPRIATE_MATCHING: ResultCode = ResultCode(18);
    pub const CONSTRAINT_VIOLATION: ResultCode = ResultCode(19);
    pub const ATTRIBUTE_OR_VALUE_EXISTS: ResultCode = ResultCode(20);
    pub const INVALID_ATTRIBUTE_SYNTAX: ResultCode = ResultCode(21);
    pub const NO_SUCH_OBJECT: ResultCode = ResultCode(32);
    pub const ALIAS_PROBLEM: ResultCode = ResultCode(33);
    pub const INVALID_DN_SYNTAX: ResultCode = ResultCode(34);
    pub const ALIAS_DEREFERENCING_PROBLEM: ResultCode = ResultCode(36);
    pub const INAPPROPRIATE_AUTHENTICATION: ResultCode = ResultCode(48);
    pub const INVALID_CREDENTIALS: ResultCode = ResultCode(49);
    pub const INSUFFICIENT_ACCESS_RIGHTS: ResultCode = ResultCode(50);
    pub const BUSY: ResultCode = ResultCode(51);
    pub const UNAVAILABLE: ResultCode = ResultCode(52);
    pub const UNWILLING_TO_PERFORM: ResultCode = ResultCode(53);
    pub const LOOP_DETECT: ResultCode = ResultCode(54);
    pub const NAMING_VIOLATION: ResultCode = ResultCode(64);
    pub const OBJECT_CLASS_VIOLATION: ResultCode = ResultCode(65);
    pub const NOT_ALLOWED_ON_NONLEAF: ResultCode = ResultCode(66);
    pub const NOT_ALLOWED_ON_RDN: ResultCode = ResultCode(67);
    pub const ENTRY_ALREADY_EXISTS: ResultCode = ResultCode(68);
    pub const OBJECT_CLASS_MODS_PROHIBITED: ResultCode = ResultCode(69);
    pub const AFFECTS_MULTIPLE_DSAS: ResultCode = ResultCode(71);
    pub const OTHER: ResultCode = ResultCode(80);
    pub const SERVER_DOWN: ResultCode = ResultCode(81);
    pub const LOCAL_ERROR: ResultCode = ResultCode(82);
    pub const ENCODING_ERROR: ResultCode = ResultCode(83);
    pub const DECODING_ERROR: ResultCode = ResultCode(84);
    pub const TIMEOUT: ResultCode = ResultCode(85);
    pub const AUTH_UNKNOWN: ResultCode = ResultCode(86);
    pub const FILTER_ERROR: ResultCode = ResultCode(87);
    pub const USER_CANCELED: ResultCode = ResultCode(88);
    pub const PARAM_ERROR: ResultCode = ResultCode(89);
    pub const NO_MEMORY: ResultCode = ResultCode(90);
    pub const CONNECT_ERROR: ResultCode = ResultCode(91);
    pub const NOT_SUPPORTED: ResultCode = ResultCode(92);
    pub const CONTROL_NOT_FOUND: ResultCode = ResultCode(93);
    pub const NO_RESULTS_RETURNED: ResultCode = ResultCode(94);
    pub const MORE_RESULTS_TO_RETURN: ResultCode = ResultCode(95);
    pub const CLIENT_LOOP: ResultCode = ResultCode(96);
    pub const REFERRAL_LIMIT_EXCEEDED: ResultCode = ResultCode(97);
    pub const CANCELED: ResultCode = ResultCode(118);
    pub const NO_SUCH_OPERATION: ResultCode = ResultCode(119);
    pub const TOO_LATE: ResultCode = ResultCode(120);
    pub const CANNOT_CANCEL: ResultCode = ResultCode(121);
    pub const ASSERTION_FAILED: ResultCode = ResultCode(122);
    pub const AUTHORIZATION_DENIED: ResultCode = ResultCode(123);
    pub const NO_OPERATION: ResultCode = ResultCode(16654);

    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> i32 {
        self.0
    }

    pub fn is_success(&self) -> bool {
        *self == ResultCode::SUCCESS
    }

    /// Returns the standard name of this result code, if it has one
    pub fn name(&self) -> Option<&'static str> {
        let name = match self.0 {
            0 => "success",
            1 => "operations error",
            2 => "protocol error",
            3 => "time limit exceeded",
            4 => "size limit exceeded",
            5 => "compare false",
            6 => "compare true",
            7 => "auth method not supported",
            8 => "strong auth required",
            10 => "referral",
            11 => "admin limit exceeded",
            12 => "unavailable critical extension",
            13 => "confidentiality required",
            14 => "sasl bind in progress",
            16 => "no such attribute",
            17 => "undefined attribute type",
            18 => "inappropriate matching",
            19 => "constraint violation",
            20 => "attribute or value exists",
            21 => "invalid attribute syntax",
            32 => "no such object",
            33 => "alias problem",
            34 => "invalid DN syntax",
            36 => "alias dereferencing problem",
            48 => "inappropriate authentication",
            49 => "invalid credentials",
            50 => "insufficient access rights",
            51 => "busy",
            52 => "unavailable",
            53 => "unwilling to perform",
            54 => "loop detect",
            64 => "naming violation",
            65 => "object class violation",
            66 => "not allowed on nonleaf",
            67 => "not allowed on RDN",
            68 => "entry already exists",
            69 => "object class mods prohibited",
            71 => "affects multiple DSAs",
            80 => "other",
            81 => "server down",
            82 => "local error",
            83 => "encoding error",
            84 => "decoding error",
            85 => "timeout",
            86 => "auth unknown",
            87 => "filter error",
            88 => "user canceled",
            89 => "parameter error",
            90 => "no memory",
            91 => "connect error",
            92 => "not supported",
            93 => "control not found",
            94 => "no results returned",
            95 => "more results to return",
            96 => "client loop",
            97 => "referral limit exceeded",
            118 => "canceled",
            119 => "no such operation",
            120 => "too late",
            121 => "cannot cancel",
            122 => "assertion failed",
            123 => "authorization denied",
            16654 => "no operation",
            _ => return None,
        };
        Some(name)
    }
}

impl From<i32> for ResultCode {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", self.0, name),
            None => write!(f, "{}", self.0),
        }
    }
}
