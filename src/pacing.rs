//! Ritmo de presentación de las respuestas.
//!
//! Política pura de presentación: los agentes "hablan" uno tras otro con una
//! pausa fija antes de cada turno (1200 ms por defecto). No depende del orden
//! en que terminaron los steps; el output ya está completo cuando se presenta.

use std::time::Duration;

use comm_adapters::AgentRole;
use serde_json::Value;

pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(1200);

/// Un turno de presentación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    pub role: AgentRole,
    /// Pausa antes de mostrar este turno.
    pub delay: Duration,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealSchedule {
    delay: Duration,
    lineup: Vec<(AgentRole, &'static str)>,
}

impl Default for RevealSchedule {
    fn default() -> Self {
        Self::check_en()
    }
}

impl RevealSchedule {
    /// Supporter, examiner y mediador, en ese orden.
    pub fn check_en() -> Self {
        Self { delay: DEFAULT_REVEAL_DELAY,
               lineup: vec![(AgentRole::Supporter, "supporterResponse"),
                            (AgentRole::Examiner, "examinerResponse"),
                            (AgentRole::Mediator, "mediatorResponse")] }
    }

    pub fn baseline() -> Self {
        Self { delay: DEFAULT_REVEAL_DELAY,
               lineup: vec![(AgentRole::Baseline, "baselineResponse")] }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Turnos para `output`. Un campo ausente se presenta con un texto de
    /// reemplazo en lugar de cortar la secuencia.
    pub fn reveals(&self, output: &Value) -> Vec<Reveal> {
        self.lineup
            .iter()
            .map(|(role, field)| Reveal { role: *role,
                                          delay: self.delay,
                                          text: output.get(*field)
                                                      .and_then(Value::as_str)
                                                      .map(str::to_string)
                                                      .unwrap_or_else(|| format!("(no response from {role})")) })
            .collect()
    }

    /// Tiempo total hasta el último turno.
    pub fn total_duration(&self) -> Duration {
        self.delay * self.lineup.len() as u32
    }

    /// Presenta los turnos respetando las pausas.
    pub async fn play<F>(&self, output: &Value, mut sink: F)
        where F: FnMut(&Reveal)
    {
        for reveal in self.reveals(output) {
            if !reveal.delay.is_zero() {
                tokio::time::sleep(reveal.delay).await;
            }
            sink(&reveal);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn check_en_order_and_delays() {
        let schedule = RevealSchedule::default();
        let out = json!({"mediatorResponse": "m", "supporterResponse": "s", "examinerResponse": "e"});
        let reveals = schedule.reveals(&out);
        let roles: Vec<_> = reveals.iter().map(|r| r.role).collect();
        assert_eq!(roles, vec![AgentRole::Supporter, AgentRole::Examiner, AgentRole::Mediator]);
        assert!(reveals.iter().all(|r| r.delay == Duration::from_millis(1200)));
        assert_eq!(schedule.total_duration(), Duration::from_millis(3600));
    }

    #[test]
    fn missing_field_gets_placeholder() {
        let reveals = RevealSchedule::check_en().reveals(&json!({"supporterResponse": "s"}));
        assert_eq!(reveals[1].text, "(no response from Examiner)");
    }

    #[test]
    fn play_emits_in_order() {
        let schedule = RevealSchedule::check_en().with_delay(Duration::ZERO);
        let out = json!({"supporterResponse": "s", "examinerResponse": "e", "mediatorResponse": "m"});
        let mut seen = Vec::new();
        // sin pausa no hace falta runtime con timer
        tokio_test::block_on(schedule.play(&out, |r| seen.push(r.text.clone())));
        assert_eq!(seen, vec!["s", "e", "m"]);
    }
}
