/// Primary key of a review row.
pub type ReviewId = i64;

/// Primary key of a member row. Supplied by the authentication layer.
pub type MemberId = i64;

/// Primary key of a book row.
pub type BookId = i64;

/// Primary key of a vote record row.
pub type VoteId = i64;

/// Primary key of a review report row.
pub type ReportId = i64;
