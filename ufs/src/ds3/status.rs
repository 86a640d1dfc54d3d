use crate::UfsError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
    NotFound,
    Conflict,
    InternalServerError,
    NotImplemented,
    InsufficientStorage,
}

impl Status {
    pub fn code(&self) -> u16 {
        use Status::*;

        return match self {
            Ok => 200,
            BadRequest => 400,
            NotFound => 404,
            Conflict => 409,
            InternalServerError => 500,
            NotImplemented => 501,
            InsufficientStorage => 507,
        };
    }

    pub fn reason(&self) -> &'static str {
        use Status::*;

        return match self {
            Ok => "OK",
            BadRequest => "Bad Request",
            NotFound => "Not Found",
            Conflict => "Conflict",
            InternalServerError => "Internal Server Error",
            NotImplemented => "Not Implemented",
            InsufficientStorage => "Insufficient Storage",
        };
    }

    pub fn is_success(&self) -> bool {
        return *self == Status::Ok;
    }
}

/// Which kind of request an engine error surfaced in. Allocation failures only mean
/// "insufficient storage" when the request was trying to store something.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    Resolve,
    Create,
    Write,
    Unlink,
}

pub(crate) fn status_for(error: &UfsError, phase: Phase) -> Status {
    return match (error, phase) {
        (UfsError::Disk(_), _) | (UfsError::CorruptedSuperBlock, _) => Status::InternalServerError,
        (UfsError::NotFound, _) => Status::NotFound,
        (UfsError::NotEnoughSpace, Phase::Create) | (UfsError::NotEnoughSpace, Phase::Write) => {
            Status::InsufficientStorage
        }
        (UfsError::InvalidSize, Phase::Write) => Status::InsufficientStorage,
        (UfsError::InvalidType, Phase::Create) => Status::Conflict,
        _ => Status::BadRequest,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_allocation_failures() {
        assert_eq!(
            status_for(&UfsError::NotEnoughSpace, Phase::Create),
            Status::InsufficientStorage
        );
        assert_eq!(
            status_for(&UfsError::InvalidSize, Phase::Write),
            Status::InsufficientStorage
        );
        assert_eq!(
            status_for(&UfsError::NotEnoughSpace, Phase::Resolve),
            Status::BadRequest
        );
    }

    #[test]
    fn test_conflicts_only_on_create() {
        assert_eq!(status_for(&UfsError::InvalidType, Phase::Create), Status::Conflict);
        assert_eq!(status_for(&UfsError::InvalidType, Phase::Write), Status::BadRequest);
    }

    #[test]
    fn test_device_failures() {
        let error = UfsError::Disk(io::Error::new(io::ErrorKind::Other, "gone"));

        assert_eq!(status_for(&error, Phase::Unlink), Status::InternalServerError);
        assert_eq!(status_for(&error, Phase::Unlink).code(), 500);
    }

    #[test]
    fn test_everything_else_is_a_bad_request() {
        for error in [
            UfsError::InvalidInode,
            UfsError::InvalidName,
            UfsError::DirNotEmpty,
            UfsError::UnlinkNotAllowed,
        ]
        .iter()
        {
            assert_eq!(status_for(error, Phase::Unlink), Status::BadRequest);
        }
    }
}
