/*
Copyright 2017 Takashi Ogura

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/
use std::io;
use std::os::raw::c_int;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionPart {
    Start,
    End,
}

/// Stable integer codes returned across the C boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,
    InvalidPointer = -1,
    InvalidParameter = -2,
    LoadFailed = -3,
    PlanningFailed = -4,
    NotInitialized = -5,
    Exception = -6,
}

impl ErrorCode {
    pub fn as_c_int(self) -> c_int {
        self as c_int
    }
}

impl From<ErrorCode> for c_int {
    fn from(code: ErrorCode) -> c_int {
        code.as_c_int()
    }
}

/// Error for `gear-capi`
#[derive(Debug, Error)]
pub enum Error {
    #[error("null pointer: {0}")]
    NullPointer(&'static str),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("size mismatch: expected {expected} values, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("failed to load {path:?}: {reason}")]
    Load { path: PathBuf, reason: String },
    #[error("no collision backend available")]
    NoCollisionBackend,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("URDF error: {0}")]
    Urdf(#[from] urdf_rs::UrdfError),
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("Collision error: {part:?} is colliding")]
    Collision { part: CollisionPart },
    #[error("planning failed: {0}")]
    PlanningFailed(String),
    #[error("not initialized: {0}")]
    NotInitialized(&'static str),
    #[error("kinematics error: {0}")]
    Kinematics(#[from] k::Error),
    #[error("{0}")]
    Other(String),
}

/// Result for `gear-capi`
pub type Result<T> = ::std::result::Result<T, Error>;

impl Error {
    pub(crate) fn load<P, S>(path: P, reason: S) -> Self
    where
        P: Into<PathBuf>,
        S: ToString,
    {
        Error::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Code reported for this error at the C boundary
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::NullPointer(_) => ErrorCode::InvalidPointer,
            Error::InvalidParameter(_) | Error::SizeMismatch { .. } => ErrorCode::InvalidParameter,
            Error::Load { .. }
            | Error::NoCollisionBackend
            | Error::Io(_)
            | Error::Urdf(_)
            | Error::Xml(_) => ErrorCode::LoadFailed,
            Error::Collision { .. } | Error::PlanningFailed(_) => ErrorCode::PlanningFailed,
            Error::NotInitialized(_) => ErrorCode::NotInitialized,
            Error::Kinematics(_) | Error::Other(_) => ErrorCode::Exception,
        }
    }
}

impl<'a> From<&'a str> for Error {
    fn from(err: &'a str) -> Error {
        Error::Other(err.to_owned())
    }
}

impl From<String> for Error {
    fn from(error: String) -> Error {
        Error::Other(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ErrorCode::Success.as_c_int(), 0);
        assert_eq!(ErrorCode::InvalidPointer.as_c_int(), -1);
        assert_eq!(ErrorCode::InvalidParameter.as_c_int(), -2);
        assert_eq!(ErrorCode::LoadFailed.as_c_int(), -3);
        assert_eq!(ErrorCode::PlanningFailed.as_c_int(), -4);
        assert_eq!(ErrorCode::NotInitialized.as_c_int(), -5);
        assert_eq!(ErrorCode::Exception.as_c_int(), -6);
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            Error::SizeMismatch {
                expected: 2,
                actual: 3
            }
            .code(),
            ErrorCode::InvalidParameter
        );
        assert_eq!(
            Error::Collision {
                part: CollisionPart::End
            }
            .code(),
            ErrorCode::PlanningFailed
        );
        assert_eq!(
            Error::load("missing.urdf", "not found").code(),
            ErrorCode::LoadFailed
        );
        assert_eq!(Error::from("boom").code(), ErrorCode::Exception);
        let io = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(Error::from(io).code(), ErrorCode::LoadFailed);
    }
}
