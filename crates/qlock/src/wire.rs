use serde::{Deserialize, Serialize};

use crate::errors::{QlockError, Result};

pub type Seq = u32;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Call {
    Lock { name: String },
    Unlock { name: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub seq: Seq,
    pub call: Call,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub seq: Seq,
    pub granted: bool,
}

impl Request {
    pub fn encode(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec(self).map_err(QlockError::Encode)
    }

    pub fn decode(raw: &[u8]) -> Result<Self> {
        rmp_serde::from_slice(raw).map_err(QlockError::Decode)
    }
}

impl Response {
    pub fn encode(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec(self).map_err(QlockError::Encode)
    }

    pub fn decode(raw: &[u8]) -> Result<Self> {
        rmp_serde::from_slice(raw).map_err(QlockError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::{Call, Request, Response};

    #[test]
    fn lock_request_round_trips() {
        let request = Request {
            seq: 7,
            call: Call::Lock {
                name: "resource".to_string(),
            },
        };

        let decoded = Request::decode(&request.encode().unwrap()).unwrap();
        assert_eq!(decoded.seq, 7);
        assert!(matches!(decoded.call, Call::Lock { name } if name == "resource"));
    }

    #[test]
    fn unlock_request_round_trips() {
        let request = Request {
            seq: 8,
            call: Call::Unlock {
                name: "resource".to_string(),
            },
        };

        let decoded = Request::decode(&request.encode().unwrap()).unwrap();
        assert_eq!(decoded.seq, 8);
        assert!(matches!(decoded.call, Call::Unlock { name } if name == "resource"));
    }

    #[test]
    fn response_round_trips() {
        let response = Response {
            seq: 9,
            granted: true,
        };

        let decoded = Response::decode(&response.encode().unwrap()).unwrap();
        assert_eq!(decoded.seq, 9);
        assert!(decoded.granted);
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(Request::decode(&[0xc1, 0xff, 0x00]).is_err());
        assert!(Response::decode(&[]).is_err());
    }
}
