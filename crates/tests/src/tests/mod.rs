mod batch_submission;
mod l1_sync;
mod verification;
