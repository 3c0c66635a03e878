use serde::{Deserialize, Serialize};

/// The stance a member takes on a review.
///
/// Stored as a boolean column (`true` = recommend) and exchanged over HTTP as the
/// `isRecommend` path segment.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteDirection {
    /// Counts towards `likeCount`.
    Recommend,
    /// Counts towards `dislikeCount`.
    NotRecommend,
}

impl VoteDirection {
    pub fn is_recommend(self) -> bool {
        matches!(self, VoteDirection::Recommend)
    }

    /// The opposite stance.
    pub fn flipped(self) -> Self {
        match self {
            VoteDirection::Recommend => VoteDirection::NotRecommend,
            VoteDirection::NotRecommend => VoteDirection::Recommend,
        }
    }
}

impl From<bool> for VoteDirection {
    fn from(is_recommend: bool) -> Self {
        if is_recommend {
            VoteDirection::Recommend
        } else {
            VoteDirection::NotRecommend
        }
    }
}

impl From<VoteDirection> for bool {
    fn from(direction: VoteDirection) -> Self {
        direction.is_recommend()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_conversion() {
        assert_eq!(VoteDirection::from(true), VoteDirection::Recommend);
        assert_eq!(VoteDirection::from(false), VoteDirection::NotRecommend);
        assert!(bool::from(VoteDirection::Recommend));
        assert!(!bool::from(VoteDirection::NotRecommend));
    }

    #[test]
    fn test_flipped() {
        assert_eq!(VoteDirection::Recommend.flipped(), VoteDirection::NotRecommend);
        assert_eq!(VoteDirection::NotRecommend.flipped(), VoteDirection::Recommend);
    }
}
