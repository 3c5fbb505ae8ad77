//! Threat type codes returned by the RTI service.
//!
//! Codes are stable service-side identifiers; labels and groups follow the
//! published classification table and exist for logs and operator tooling.

pub const VALID: u16 = 0;
pub const SCRAPERS: u16 = 2;
pub const AUTOMATION_TOOLS: u16 = 3;
pub const FREQUENCY_CAPPING: u16 = 4;
pub const ABNORMAL_RATE_LIMIT: u16 = 5;
pub const EXCESSIVE_RATE_LIMIT: u16 = 6;
pub const DISABLED_JAVASCRIPT: u16 = 7;
pub const BEHAVIORAL_ANOMALIES: u16 = 8;
pub const CLICK_FARM: u16 = 9;
pub const MALICIOUS_BOTS: u16 = 10;
pub const FALSE_REPRESENTATION: u16 = 11;
pub const DATA_CENTERS: u16 = 13;
pub const VPN: u16 = 14;
pub const PROXY: u16 = 15;
pub const DISABLED_COOKIES: u16 = 16;
pub const CLICK_HIJACKING: u16 = 17;
pub const NETWORK_ANOMALIES: u16 = 18;
pub const GOOD_BOT: u16 = 19;
pub const CRAWLERS: u16 = 20;
pub const GEO_EXCLUSIONS: u16 = 21;

/// Classification group for a threat type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreatGroup {
    Valid,
    InvalidBotActivity,
    InvalidSuspiciousActivity,
    InvalidMaliciousActivity,
    KnownBots,
    UndeclaredBots,
}

impl ThreatGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatGroup::Valid => "valid",
            ThreatGroup::InvalidBotActivity => "invalid_bot_activity",
            ThreatGroup::InvalidSuspiciousActivity => "invalid_suspicious_activity",
            ThreatGroup::InvalidMaliciousActivity => "invalid_malicious_activity",
            ThreatGroup::KnownBots => "known_bots",
            ThreatGroup::UndeclaredBots => "undeclared_bots",
        }
    }
}

/// Human-readable label for a threat code, `None` for unknown codes.
pub fn label(code: u16) -> Option<&'static str> {
    Some(match code {
        VALID => "Valid",
        SCRAPERS => "Scrapers",
        AUTOMATION_TOOLS => "Automation Tools",
        FREQUENCY_CAPPING => "Frequency Capping",
        ABNORMAL_RATE_LIMIT => "Abnormal Rate Limit",
        EXCESSIVE_RATE_LIMIT => "Excessive Rate Limit",
        DISABLED_JAVASCRIPT => "Disabled JavaScript",
        BEHAVIORAL_ANOMALIES => "Behavioral Anomalies",
        CLICK_FARM => "Click Farm",
        MALICIOUS_BOTS => "Malicious Bots",
        FALSE_REPRESENTATION => "False Representation",
        DATA_CENTERS => "Data Centers",
        VPN => "VPN",
        PROXY => "Proxy",
        DISABLED_COOKIES => "Disabled Cookies",
        CLICK_HIJACKING => "Click Hijacking",
        NETWORK_ANOMALIES => "Network Anomalies",
        GOOD_BOT => "Good Bot",
        CRAWLERS => "Crawlers",
        GEO_EXCLUSIONS => "Geo Exclusions",
        _ => return None,
    })
}

/// Classification group for a threat code, `None` for unknown codes.
pub fn group(code: u16) -> Option<ThreatGroup> {
    Some(match code {
        VALID => ThreatGroup::Valid,
        SCRAPERS | AUTOMATION_TOOLS | MALICIOUS_BOTS => ThreatGroup::InvalidBotActivity,
        FREQUENCY_CAPPING | ABNORMAL_RATE_LIMIT | DATA_CENTERS | VPN | PROXY | GEO_EXCLUSIONS => {
            ThreatGroup::InvalidSuspiciousActivity
        }
        EXCESSIVE_RATE_LIMIT | DISABLED_JAVASCRIPT | BEHAVIORAL_ANOMALIES | CLICK_FARM
        | FALSE_REPRESENTATION | DISABLED_COOKIES | CLICK_HIJACKING | NETWORK_ANOMALIES => {
            ThreatGroup::InvalidMaliciousActivity
        }
        GOOD_BOT => ThreatGroup::KnownBots,
        CRAWLERS => ThreatGroup::UndeclaredBots,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_known_codes() {
        assert_eq!(label(VALID), Some("Valid"));
        assert_eq!(label(SCRAPERS), Some("Scrapers"));
        assert_eq!(label(MALICIOUS_BOTS), Some("Malicious Bots"));
        assert_eq!(label(GEO_EXCLUSIONS), Some("Geo Exclusions"));
    }

    #[test]
    fn test_label_unknown_code() {
        assert_eq!(label(1), None);
        assert_eq!(label(12), None);
        assert_eq!(label(99), None);
    }

    #[test]
    fn test_group_known_codes() {
        assert_eq!(group(VALID), Some(ThreatGroup::Valid));
        assert_eq!(group(SCRAPERS), Some(ThreatGroup::InvalidBotActivity));
        assert_eq!(group(VPN), Some(ThreatGroup::InvalidSuspiciousActivity));
        assert_eq!(group(CLICK_FARM), Some(ThreatGroup::InvalidMaliciousActivity));
        assert_eq!(group(GOOD_BOT), Some(ThreatGroup::KnownBots));
        assert_eq!(group(CRAWLERS), Some(ThreatGroup::UndeclaredBots));
    }

    #[test]
    fn test_every_labeled_code_has_a_group() {
        for code in 0..=21 {
            assert_eq!(label(code).is_some(), group(code).is_some(), "code {code}");
        }
    }
}
