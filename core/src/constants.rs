//! Production endpoints and the accounts API error-code table.

/// Production accounts API.
pub const API_BASE: &str = "https://accounts-api.dynastic.co";

/// Production accounts frontend.
pub const FRONTEND_BASE: &str = "https://accounts.dynastic.co";

macro_rules! error_codes {
    ($($variant:ident => ($name:literal, $code:literal)),+ $(,)?) => {
        /// Error codes reported by the accounts API in `error.code`.
        ///
        /// Codes below 1000 follow HTTP; 1000 and above are service specific.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ErrorCode {
            $($variant),+
        }

        impl ErrorCode {
            pub const ALL: &'static [ErrorCode] = &[$(ErrorCode::$variant),+];

            pub const fn code(self) -> u32 {
                match self {
                    $(ErrorCode::$variant => $code),+
                }
            }

            /// Symbolic name as used on the wire, e.g. `"BAD_REQUEST"`.
            pub const fn name(self) -> &'static str {
                match self {
                    $(ErrorCode::$variant => $name),+
                }
            }
        }
    };
}

error_codes! {
    BadRequest => ("BAD_REQUEST", 400),
    Unauthorized => ("UNAUTHORIZED", 401),
    Forbidden => ("FORBIDDEN", 403),
    NotFound => ("NOT_FOUND", 404),
    RateLimited => ("RATE_LIMITED", 429),
    InternalError => ("INTERNAL_ERROR", 1000),
    MissingFields => ("MISSING_FIELDS", 1001),
    InvalidCredentials => ("INVALID_CREDENTIALS", 1002),
    Unauthenticated => ("UNAUTHENTICATED", 1003),
    PasswordsMayNotMatch => ("PASSWORDS_MAY_NOT_MATCH", 1005),
    EmailInUse => ("EMAIL_IN_USE", 1007),
    DeviceAlreadyRegistered => ("DEVICE_ALREADY_REGISTERED", 1008),
    HibpFlagged => ("HIBP_FLAGGED", 1009),
    HibpApiError => ("HIBP_API_ERROR", 1010),
    AlreadyHas2fa => ("ALREADY_HAS_2FA", 1011),
    InvalidTotpToken => ("INVALID_TOTP_TOKEN", 1012),
    No2fa => ("NO_2FA", 1013),
    MfaRequired => ("MFA_REQUIRED", 1023),
    OauthFail => ("OAUTH_FAIL", 1014),
    MissingEmail => ("MISSING_EMAIL", 1015),
    UnverifiedEmail => ("UNVERIFIED_EMAIL", 1016),
    MissingRecaptcha => ("MISSING_RECAPTCHA", 1017),
    InvalidRecaptcha => ("INVALID_RECAPTCHA", 1018),
    LinkedToAnotherAccount => ("LINKED_TO_ANOTHER_ACCOUNT", 1019),
    NoFallbackLoginMethod => ("NO_FALLBACK_LOGIN_METHOD", 1020),
    InvalidSessionToken => ("INVALID_SESSION_TOKEN", 1021),
    Banned => ("BANNED", 1022),
    AgreementRequired => ("AGREEMENT_REQUIRED", 1023),
}

impl ErrorCode {
    /// Look up a numeric code. 1023 is shared by `MFA_REQUIRED` and
    /// `AGREEMENT_REQUIRED`; the first entry in table order wins.
    pub fn from_code(code: u32) -> Option<ErrorCode> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }

    pub fn from_name(name: &str) -> Option<ErrorCode> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }
}
