use crate::db::SubmissionStatus;

pub const INSTITUTIONAL_DOMAIN: &str = "@sfsu.edu";

// Case-sensitive, untrimmed: `a@SFSU.EDU` and `a@sfsu.edu ` both go to review.
pub fn classify(email: &str) -> SubmissionStatus {
    if email.ends_with(INSTITUTIONAL_DOMAIN) {
        SubmissionStatus::Approved
    } else {
        SubmissionStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn institutional_address_is_approved() {
        assert_eq!(classify("a@sfsu.edu"), SubmissionStatus::Approved);
        assert_eq!(classify("jane.doe@sfsu.edu"), SubmissionStatus::Approved);
    }

    #[test]
    fn match_is_case_sensitive() {
        assert_eq!(classify("a@SFSU.EDU"), SubmissionStatus::Pending);
        assert_eq!(classify("a@Sfsu.edu"), SubmissionStatus::Pending);
    }

    #[test]
    fn suffix_must_be_at_the_end() {
        assert_eq!(classify("a@sfsu.edu.com"), SubmissionStatus::Pending);
        assert_eq!(classify("a@sfsu.edu "), SubmissionStatus::Pending);
    }

    #[test]
    fn other_domains_are_pending() {
        assert_eq!(classify("x@gmail.com"), SubmissionStatus::Pending);
        assert_eq!(classify("x@mail.sfsu.edu"), SubmissionStatus::Pending);
        assert_eq!(classify(""), SubmissionStatus::Pending);
    }
}
