//! CRM pipeline stages and their derived flags.
//!
//! Declaration order of each enum is the pipeline order; `ordinal` is what gets stored
//! in `stage_order`. Labels are compared byte for byte with the CRM's stage names.

use entity::candidate_opportunity::Stage as CandidateStage;
use entity::salesforce_job_opp::Stage as JobStage;
use sea_orm::Iterable;

use crate::error::{TalentError, TalentResult};

pub trait OpportunityStage: Copy + Eq + std::fmt::Debug + Iterable + 'static {
    /// Stage name exactly as the CRM spells it.
    fn salesforce_stage_name(self) -> &'static str;

    fn is_closed(self) -> bool;

    fn is_won(self) -> bool;

    /// Position in pipeline order, starting at 0.
    fn ordinal(self) -> i32;

    fn all() -> Vec<Self> {
        Self::iter().collect()
    }

    /// Look a stage up by its CRM name.
    fn text_to_enum(label: &str) -> TalentResult<Self> {
        Self::iter()
            .find(|stage| stage.salesforce_stage_name() == label)
            .ok_or_else(|| TalentError::UnknownStage(label.to_string()))
    }
}

impl OpportunityStage for CandidateStage {
    fn salesforce_stage_name(self) -> &'static str {
        match self {
            CandidateStage::Prospect => "Prospect",
            CandidateStage::MiniIntake => "Mini intake",
            CandidateStage::FullIntake => "Full intake",
            CandidateStage::VisaEligibility => "Visa eligibility",
            CandidateStage::CvPreparation => "CV preparation",
            CandidateStage::CvReview => "CV review",
            CandidateStage::OneWayPreparation => "1 way preparation",
            CandidateStage::OneWayReview => "1 way review",
            CandidateStage::TestPreparation => "Test preparation",
            CandidateStage::Testing => "Testing",
            CandidateStage::TwoWayPreparation => "2 way preparation",
            CandidateStage::TwoWayReview => "2 way review",
            CandidateStage::Offer => "Offer",
            CandidateStage::Acceptance => "Acceptance",
            CandidateStage::ProvincialVisaPreparation => "Provincial visa preparation",
            CandidateStage::ProvincialVisaProcessing => "Provincial visa processing",
            CandidateStage::VisaPreparation => "Visa preparation",
            CandidateStage::VisaProcessing => "Visa processing",
            CandidateStage::Relocating => "Relocating",
            CandidateStage::Relocated => "Relocated",
            CandidateStage::Settled => "Settled",
            CandidateStage::DurableSolution => "Durable solution",
            CandidateStage::NoJobOffer => "No job offer",
            CandidateStage::NoVisa => "No visa",
            CandidateStage::NotFitForRole => "Not fit for role",
            CandidateStage::NotEligibleForTc => "Not eligible for TC",
            CandidateStage::NotEligibleForVisa => "Not eligible for visa",
            CandidateStage::NoInterview => "No interview",
            CandidateStage::CandidateLeavesDestination => "Candidate leaves destination",
            CandidateStage::CandidateRejectsOffer => "Candidate rejects offer",
            CandidateStage::CandidateWithdraws => "Candidate withdraws",
            CandidateStage::CandidateMistakenProspect => "Candidate was a mistaken prospect",
            CandidateStage::JobIneligible => "Job was ineligible",
            CandidateStage::JobWithdrawn => "Job was withdrawn",
            CandidateStage::RelocatedNoJobOfferPathway => "Relocated (no job offer pathway)",
        }
    }

    fn is_closed(self) -> bool {
        matches!(
            self,
            CandidateStage::Settled
                | CandidateStage::DurableSolution
                | CandidateStage::RelocatedNoJobOfferPathway
        ) || self.is_lost()
    }

    fn is_won(self) -> bool {
        matches!(
            self,
            CandidateStage::Settled
                | CandidateStage::DurableSolution
                | CandidateStage::RelocatedNoJobOfferPathway
        )
    }

    fn ordinal(self) -> i32 {
        self as i32
    }
}

/// Candidate-only flags.
pub trait CandidateStageExt {
    /// The candidate holds a job once the opportunity reaches this stage.
    fn is_employed(self) -> bool;

    /// Closed without success.
    fn is_lost(self) -> bool;
}

impl CandidateStageExt for CandidateStage {
    fn is_employed(self) -> bool {
        let ordinal = self as i32;
        ordinal >= CandidateStage::Acceptance as i32
            && ordinal <= CandidateStage::DurableSolution as i32
    }

    fn is_lost(self) -> bool {
        let ordinal = self as i32;
        ordinal >= CandidateStage::NoJobOffer as i32 && ordinal <= CandidateStage::JobWithdrawn as i32
    }
}

impl OpportunityStage for JobStage {
    fn salesforce_stage_name(self) -> &'static str {
        match self {
            JobStage::Prospect => "Prospect",
            JobStage::Briefing => "Briefing",
            JobStage::Pitching => "Pitching",
            JobStage::Mou => "MOU",
            JobStage::MouIssue => "MOU issue",
            JobStage::IdentifyingRoles => "Identifying roles",
            JobStage::CandidateSearch => "Candidate search",
            JobStage::VisaEligibility => "Visa eligibility",
            JobStage::CvPreparation => "CV preparation",
            JobStage::CvReview => "CV review",
            JobStage::RecruitmentProcess => "Recruitment process",
            JobStage::JobOffer => "Job offer",
            JobStage::VisaPreparation => "Visa preparation",
            JobStage::PostHireEngagement => "Post hire engagement",
            JobStage::HiringCompleted => "Hiring completed",
            JobStage::IneligibleEmployer => "Ineligible employer",
            JobStage::IneligibleOccupation => "Ineligible occupation",
            JobStage::IneligibleRegion => "Ineligible region",
            JobStage::NoInterest => "No interest",
            JobStage::NoJobOffer => "No job offer",
            JobStage::NoPrPathway => "No PR pathway",
            JobStage::NoSuitableCandidates => "No suitable candidates",
            JobStage::NoVisa => "No visa",
            JobStage::TooExpensive => "Too expensive",
            JobStage::TooHighWage => "Too high wage",
            JobStage::TooLong => "Too long",
        }
    }

    fn is_closed(self) -> bool {
        self.ordinal() >= JobStage::HiringCompleted.ordinal()
    }

    fn is_won(self) -> bool {
        self == JobStage::HiringCompleted
    }

    fn ordinal(self) -> i32 {
        self as i32
    }
}

/// Job stages during which the employer is actively looking at candidates.
pub fn is_recruiting(stage: JobStage) -> bool {
    let ordinal = stage.ordinal();
    ordinal >= JobStage::CandidateSearch.ordinal() && ordinal <= JobStage::JobOffer.ordinal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_for_every_stage() {
        for stage in CandidateStage::all() {
            let label = stage.salesforce_stage_name();
            assert_eq!(CandidateStage::text_to_enum(label).unwrap(), stage, "{label}");
        }
        for stage in JobStage::all() {
            let label = stage.salesforce_stage_name();
            assert_eq!(JobStage::text_to_enum(label).unwrap(), stage, "{label}");
        }
    }

    #[test]
    fn unknown_labels_are_rejected() {
        for label in ["", "prospect", "Prospect ", "Closed Won", "cvReview"] {
            let err = CandidateStage::text_to_enum(label).unwrap_err();
            assert!(matches!(err, TalentError::UnknownStage(ref got) if got == label));
            assert!(JobStage::text_to_enum(label).is_err());
        }
    }

    #[test]
    fn ordinals_follow_declaration_order() {
        for (index, stage) in CandidateStage::all().into_iter().enumerate() {
            assert_eq!(stage.ordinal(), index as i32);
        }
        for (index, stage) in JobStage::all().into_iter().enumerate() {
            assert_eq!(stage.ordinal(), index as i32);
        }
        assert_eq!(CandidateStage::Prospect.ordinal(), 0);
        assert_eq!(JobStage::TooLong.ordinal(), 25);
    }

    #[test]
    fn won_stages_are_closed() {
        for stage in CandidateStage::all() {
            if stage.is_won() {
                assert!(stage.is_closed(), "{stage:?}");
            }
        }
        for stage in JobStage::all() {
            if stage.is_won() {
                assert!(stage.is_closed(), "{stage:?}");
            }
        }
    }

    #[test]
    fn candidate_flags() {
        assert!(!CandidateStage::Offer.is_employed());
        assert!(CandidateStage::Acceptance.is_employed());
        assert!(CandidateStage::Relocated.is_employed());
        assert!(!CandidateStage::Relocated.is_closed());
        assert!(CandidateStage::Settled.is_won());
        assert!(CandidateStage::NotEligibleForTc.is_closed());
        assert!(!CandidateStage::NotEligibleForTc.is_won());
        assert!(CandidateStage::RelocatedNoJobOfferPathway.is_won());
        assert!(!CandidateStage::RelocatedNoJobOfferPathway.is_employed());
    }

    #[test]
    fn job_flags() {
        assert!(!JobStage::PostHireEngagement.is_closed());
        assert!(JobStage::HiringCompleted.is_won());
        assert!(JobStage::TooLong.is_closed());
        assert!(!JobStage::NoVisa.is_won());
        assert!(is_recruiting(JobStage::CandidateSearch));
        assert!(is_recruiting(JobStage::JobOffer));
        assert!(!is_recruiting(JobStage::VisaPreparation));
    }
}
