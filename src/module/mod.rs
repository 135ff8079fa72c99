pub mod withdrawal_job;
