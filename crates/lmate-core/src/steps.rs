// ── Onboarding step rail ──
//
// Derived, never stored: completion of each step is a pure function of
// the current snapshot.

use lmate_api::OnboardingStatus;
use serde::Serialize;

use crate::model::DeviceSnapshot;

/// Onboarding steps in rail order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    strum::Display,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Step {
    Dhcp,
    ObRecords,
    Onboard,
    DeviceActive,
}

impl Step {
    pub const FLOW: [Step; 4] = [Step::Dhcp, Step::ObRecords, Step::Onboard, Step::DeviceActive];

    pub fn label(self) -> &'static str {
        match self {
            Self::Dhcp => "DHCP Lease",
            Self::ObRecords => "O.B Records",
            Self::Onboard => "AO Onboard",
            Self::DeviceActive => "Device Active",
        }
    }
}

/// Per-step completion flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StepCompletion {
    pub dhcp: bool,
    pub ob_records: bool,
    pub onboard: bool,
    pub device_active: bool,
}

impl StepCompletion {
    pub fn is_complete(self, step: Step) -> bool {
        match step {
            Step::Dhcp => self.dhcp,
            Step::ObRecords => self.ob_records,
            Step::Onboard => self.onboard,
            Step::DeviceActive => self.device_active,
        }
    }
}

/// Icon state of one step on the rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StepIndicator {
    Complete,
    InProgress,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepProgress {
    pub completed: StepCompletion,
    /// First incomplete step in rail order; `None` once all are complete.
    pub current: Option<Step>,
}

impl StepProgress {
    pub fn derive(snapshot: &DeviceSnapshot) -> Self {
        let status = snapshot.onboarding.status;
        let completed = StepCompletion {
            dhcp: snapshot.onboarding.dhcp.has_ip(),
            ob_records: status != OnboardingStatus::Pending,
            onboard: status == OnboardingStatus::Done,
            device_active: snapshot.device.active,
        };
        let current = Step::FLOW
            .into_iter()
            .find(|step| !completed.is_complete(*step));
        Self { completed, current }
    }

    pub fn indicator(&self, step: Step) -> StepIndicator {
        if self.completed.is_complete(step) {
            StepIndicator::Complete
        } else if self.current == Some(step) {
            StepIndicator::InProgress
        } else {
            StepIndicator::Pending
        }
    }

    /// Every step with its indicator, in rail order.
    pub fn rail(&self) -> impl Iterator<Item = (Step, StepIndicator)> + '_ {
        Step::FLOW.into_iter().map(|step| (step, self.indicator(step)))
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_none()
    }
}
