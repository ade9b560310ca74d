mod adjustment;
mod common;
mod eligibility;
