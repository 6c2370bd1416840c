use validator::ValidationError;

pub const MAX_NAME_LENGTH: usize = 100;

pub fn validate_employee_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::new("invalid_employee_name"));
    }
    Ok(())
}

/// Ticket counts below 1 never reach the wheel; a participant with zero
/// tickets is removed from the session instead.
pub fn validate_tickets(tickets: u32) -> Result<(), ValidationError> {
    if tickets < 1 {
        return Err(ValidationError::new("invalid_ticket_count"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_rejects_whitespace_only() {
        assert!(validate_employee_name("   ").is_err());
        assert!(validate_employee_name("Kari Nordmann").is_ok());
    }

    #[test]
    fn test_tickets_require_at_least_one() {
        assert!(validate_tickets(0).is_err());
        assert!(validate_tickets(1).is_ok());
    }
}
