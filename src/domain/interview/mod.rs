//! Interview domain module: jobs, questions and submitted applications

mod application;
mod job;
mod question;

pub use application::{
    AnswerReview, Application, ApplicationFilters, ApplicationStatus, PersonalityScores,
    RevaluationStatus,
};
pub use job::{JobFilters, JobPosting, NewJobPosting, DEFAULT_JOB_TYPE};
pub use question::{Question, QuestionSet};
