//! What came back from the sponsor, reduced to the two cases the coordinator
//! acts on.

use std::fmt;
use std::time::Duration;

use freecpu_types::{CanonicalEncoding, SignResponse, Signature};

use crate::error::SponsorError;

/// Why the sponsor did not co-sign. Every variant leads to self-pay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnavailableReason {
    PolicyRejection(String),
    Transport(String),
    Timeout(Duration),
    MalformedResponse(String),
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PolicyRejection(reason) => write!(f, "policy rejection: {reason}"),
            Self::Transport(e) => write!(f, "transport failure: {e}"),
            Self::Timeout(after) => write!(f, "no answer within {}ms", after.as_millis()),
            Self::MalformedResponse(e) => write!(f, "malformed response: {e}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SponsorOutcome {
    /// The sponsor's encoding and its signature over it.
    Signed {
        encoding: CanonicalEncoding,
        signature: Signature,
    },
    Unavailable(UnavailableReason),
}

impl SponsorOutcome {
    /// Classify a sponsor reply. `timeout` is the bound the request ran under.
    ///
    /// Only the first returned signature is kept: it is the one for the
    /// sponsor's billing permission.
    pub fn from_reply(reply: Result<SignResponse, SponsorError>, timeout: Duration) -> Self {
        match reply {
            Ok(response) => match response.signatures.into_iter().next() {
                Some(signature) => Self::Signed {
                    encoding: response.serialized_transaction,
                    signature,
                },
                None => Self::Unavailable(UnavailableReason::MalformedResponse(
                    "no signatures returned".into(),
                )),
            },
            Err(SponsorError::Rejected(reason)) => {
                Self::Unavailable(UnavailableReason::PolicyRejection(reason))
            }
            Err(SponsorError::Transport(e)) => Self::Unavailable(UnavailableReason::Transport(e)),
            Err(SponsorError::Timeout) => Self::Unavailable(UnavailableReason::Timeout(timeout)),
            Err(SponsorError::MalformedResponse(e)) => {
                Self::Unavailable(UnavailableReason::MalformedResponse(e))
            }
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, Self::Signed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Duration = Duration::from_secs(3);

    #[test]
    fn first_signature_is_kept() {
        let reply = SignResponse {
            serialized_transaction: CanonicalEncoding::new(vec![1, 2]),
            signatures: vec![Signature([1; 64]), Signature([2; 64])],
        };
        match SponsorOutcome::from_reply(Ok(reply), T) {
            SponsorOutcome::Signed { encoding, signature } => {
                assert_eq!(encoding.as_bytes(), &[1, 2]);
                assert_eq!(signature, Signature([1; 64]));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_signature_list_is_malformed() {
        let reply = SignResponse {
            serialized_transaction: CanonicalEncoding::new(vec![1]),
            signatures: vec![],
        };
        assert!(matches!(
            SponsorOutcome::from_reply(Ok(reply), T),
            SponsorOutcome::Unavailable(UnavailableReason::MalformedResponse(_))
        ));
    }

    #[test]
    fn errors_map_to_reasons() {
        assert_eq!(
            SponsorOutcome::from_reply(Err(SponsorError::Rejected("no".into())), T),
            SponsorOutcome::Unavailable(UnavailableReason::PolicyRejection("no".into()))
        );
        assert_eq!(
            SponsorOutcome::from_reply(Err(SponsorError::Timeout), T),
            SponsorOutcome::Unavailable(UnavailableReason::Timeout(T))
        );
        assert!(!SponsorOutcome::from_reply(Err(SponsorError::Transport("x".into())), T).is_signed());
    }
}
