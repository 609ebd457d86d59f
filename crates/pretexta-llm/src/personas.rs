//! Attacker persona catalog for the chat roleplay.

use serde::{Deserialize, Serialize};

/// An attacker persona the model roleplays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// What the attacker is trying to obtain.
    pub goal: String,
    /// Tone and manner the model should adopt.
    pub style: String,
    /// Situation framing fed into the system prompt.
    pub context: String,
    /// Attack category label.
    pub category: String,
    /// Difficulty label.
    pub difficulty: String,
    /// Catalog description shown to the participant.
    pub description: String,
    /// First message the attacker sends.
    pub opening_line: String,
}

fn persona(
    id: &str,
    name: &str,
    goal: &str,
    style: &str,
    context: &str,
    category: &str,
    difficulty: &str,
    description: &str,
    opening_line: &str,
) -> Persona {
    Persona {
        id: id.to_owned(),
        name: name.to_owned(),
        goal: goal.to_owned(),
        style: style.to_owned(),
        context: context.to_owned(),
        category: category.to_owned(),
        difficulty: difficulty.to_owned(),
        description: description.to_owned(),
        opening_line: opening_line.to_owned(),
    }
}

/// The built-in persona catalog.
#[must_use]
pub fn catalog() -> Vec<Persona> {
    vec![
        persona(
            "ceo_urgent",
            "The Urgent CEO",
            "Force you to wire transfer money immediately.",
            "Authoritative, impatient, busy, slightly rude.",
            "Late Friday afternoon, needs urgent payment for a confidential acquisition.",
            "Business Email Compromise (BEC)",
            "hard",
            "The attacker impersonates a high-level executive demanding urgent action to bypass standard procedures.",
            "Hey, are you at your desk? I need a favor ASAP. It's confidential.",
        ),
        persona(
            "it_support",
            "IT Support (Fake)",
            "Get you to install a remote access tool or give your password.",
            "Helpful, slightly technical, pushy about security policy.",
            "Claiming your account is compromised and needs an immediate update.",
            "Tech Support Scam",
            "medium",
            "Impersonates IT staff claiming a security breach to trick you into granting remote access or credentials.",
            "Hello, this is IT Security. We detected unusual login attempts on your account. Are you currently in Singapore?",
        ),
        persona(
            "hr_recruiter",
            "Headhunter",
            "Get you to open a malicious PDF resume.",
            "Professional, flattering, promising high salary.",
            "Offering a dream job at a competitor, sends a job-description attachment.",
            "Phishing",
            "easy",
            "Lures you with a lucrative job offer to deliver malware via a document.",
            "Hi! I saw your profile and I'm incredibly impressed. We have a VP role opening that pays double your current salary. Interested?",
        ),
        persona(
            "vendor_invoice",
            "Angry Vendor",
            "Get you to pay a fake overdue invoice.",
            "Aggressive, threatening legal action, insistent.",
            "Claims payment is 90 days overdue and service will be cut off today.",
            "Finance Fraud",
            "medium",
            "An aggressive scenario where the attacker uses fear of service disruption to force a payment.",
            "THIS IS THE THIRD NOTICE. Your account is 90 days overdue. We are cutting off your services in 1 hour if payment isn't made. Are you the contact person?",
        ),
        persona(
            "internal_audit",
            "Internal Auditor",
            "Gain access to sensitive files for a compliance check.",
            "Bureaucratic, formal, citing regulations.",
            "Random surprise audit, needs immediate access to financial records.",
            "Social Engineering",
            "hard",
            "Uses authority and compliance pressure to access sensitive internal data.",
            "Good morning. This is the Internal Audit committee. We are conducting a surprise compliance check. Please confirm you have access to the client database?",
        ),
        persona(
            "govt_tax",
            "Tax Official",
            "Extract personal ID and banking info.",
            "Serious, warning about penalties, official-sounding.",
            "Claiming a tax discrepancy that requires immediate verification of identity.",
            "Vishing / Impersonation",
            "hard",
            "Impersonates a government authority to extract personally identifiable information.",
            "This is the Tax Authority. We have flagged a serious discrepancy in your filings. You are facing potential legal action. Confirm your full name and ID number immediately.",
        ),
        persona(
            "colleague_emergency",
            "Colleague in Distress",
            "Get you to send a 2FA code or login token.",
            "Panic-stricken, desperate, friendly but rushed.",
            "Locked out of their account before a big presentation, needs you to forward a code.",
            "Social Engineering",
            "medium",
            "Exploits your willingness to help a coworker in an emergency situation.",
            "I'm so sorry to bother you! I'm locked out and I have the presentation for the board in 5 minutes! Can you please check if a code was sent to the shared email?",
        ),
        persona(
            "supply_chain",
            "Logistics Coordinator",
            "Get you to change the shipping address for high-value goods.",
            "Confused, asking for clarification, trying to be helpful.",
            "A delivery driver is lost and needs to reroute a large shipment.",
            "Supply Chain Attack",
            "hard",
            "Attempts to redirect physical assets by confusing specific shipping procedures.",
            "Hi, I'm with the delivery team. I have a pallet of 50 laptops here but the address seems wrong. Can I just confirm the new warehouse address with you?",
        ),
    ]
}

/// Looks up a catalog persona by id.
#[must_use]
pub fn find(id: &str) -> Option<Persona> {
    catalog().into_iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_eight_distinct_personas() {
        let personas = catalog();
        assert_eq!(personas.len(), 8);
        let mut ids: Vec<&str> = personas.iter().map(|p| p.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn test_find_by_id() {
        assert_eq!(find("ceo_urgent").unwrap().name, "The Urgent CEO");
        assert!(find("nonexistent").is_none());
    }
}
