//! Concrete screens. Each one is a `ResourceDescriptor` value; the generic
//! dashboard in `controller::screen` does the rest.

use crate::descriptor::ResourceDescriptor;

pub mod audience;
pub mod content;
pub mod finance;
pub mod marketing;
pub mod platform;
pub mod sales;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ScreenId {
    Overview,
    Orders,
    Customers,
    Products,
    Deliveries,
    SmsCampaigns,
    EmailCampaigns,
    PushNotifications,
    WhatsAppCampaigns,
    Affiliates,
    Segments,
    Audiences,
    Journeys,
    Automations,
    Loyalty,
    Videos,
    Forms,
    LiveChat,
    TaxRates,
    TaxRules,
    PaymentMethods,
    PaymentGateways,
    Transactions,
    AiFeatures,
    AiTasks,
    ApiKeys,
    Settings,
}

impl ScreenId {
    pub const ALL: [ScreenId; 27] = [
        ScreenId::Overview,
        ScreenId::Orders,
        ScreenId::Customers,
        ScreenId::Products,
        ScreenId::Deliveries,
        ScreenId::SmsCampaigns,
        ScreenId::EmailCampaigns,
        ScreenId::PushNotifications,
        ScreenId::WhatsAppCampaigns,
        ScreenId::Affiliates,
        ScreenId::Segments,
        ScreenId::Audiences,
        ScreenId::Journeys,
        ScreenId::Automations,
        ScreenId::Loyalty,
        ScreenId::Videos,
        ScreenId::Forms,
        ScreenId::LiveChat,
        ScreenId::TaxRates,
        ScreenId::TaxRules,
        ScreenId::PaymentMethods,
        ScreenId::PaymentGateways,
        ScreenId::Transactions,
        ScreenId::AiFeatures,
        ScreenId::AiTasks,
        ScreenId::ApiKeys,
        ScreenId::Settings,
    ];

    pub fn path(self) -> &'static str {
        match self {
            ScreenId::Overview => "/",
            ScreenId::Orders => "/orders",
            ScreenId::Customers => "/customers",
            ScreenId::Products => "/products",
            ScreenId::Deliveries => "/deliveries",
            ScreenId::SmsCampaigns => "/sms-campaigns",
            ScreenId::EmailCampaigns => "/email-campaigns",
            ScreenId::PushNotifications => "/push-notifications",
            ScreenId::WhatsAppCampaigns => "/whatsapp-campaigns",
            ScreenId::Affiliates => "/affiliates",
            ScreenId::Segments => "/segments",
            ScreenId::Audiences => "/audiences",
            ScreenId::Journeys => "/customer-journeys",
            ScreenId::Automations => "/automations",
            ScreenId::Loyalty => "/loyalty-program",
            ScreenId::Videos => "/videos",
            ScreenId::Forms => "/forms",
            ScreenId::LiveChat => "/live-chat",
            ScreenId::TaxRates => "/tax-rates",
            ScreenId::TaxRules => "/tax-rules",
            ScreenId::PaymentMethods => "/payment-methods",
            ScreenId::PaymentGateways => "/payment-gateways",
            ScreenId::Transactions => "/transactions",
            ScreenId::AiFeatures => "/ai-features",
            ScreenId::AiTasks => "/ai-tasks",
            ScreenId::ApiKeys => "/api-keys",
            ScreenId::Settings => "/settings",
        }
    }

    pub fn section(self) -> &'static str {
        match self {
            ScreenId::Overview => "Overview",
            ScreenId::Orders | ScreenId::Customers | ScreenId::Products | ScreenId::Deliveries => {
                "Sales"
            }
            ScreenId::SmsCampaigns
            | ScreenId::EmailCampaigns
            | ScreenId::PushNotifications
            | ScreenId::WhatsAppCampaigns
            | ScreenId::Affiliates => "Marketing",
            ScreenId::Segments
            | ScreenId::Audiences
            | ScreenId::Journeys
            | ScreenId::Automations
            | ScreenId::Loyalty => "Audience",
            ScreenId::Videos | ScreenId::Forms | ScreenId::LiveChat => "Content",
            ScreenId::TaxRates
            | ScreenId::TaxRules
            | ScreenId::PaymentMethods
            | ScreenId::PaymentGateways
            | ScreenId::Transactions => "Finance",
            ScreenId::AiFeatures | ScreenId::AiTasks | ScreenId::ApiKeys | ScreenId::Settings => {
                "Platform"
            }
        }
    }

    pub fn from_path(path: &str) -> Option<ScreenId> {
        ScreenId::ALL.into_iter().find(|id| id.path() == path)
    }

    pub fn from_key(key: &str) -> Option<ScreenId> {
        ScreenId::ALL.into_iter().find(|id| id.descriptor().key == key)
    }

    pub fn descriptor(self) -> ResourceDescriptor {
        match self {
            ScreenId::Overview => sales::overview(),
            ScreenId::Orders => sales::orders(),
            ScreenId::Customers => sales::customers(),
            ScreenId::Products => sales::products(),
            ScreenId::Deliveries => sales::deliveries(),
            ScreenId::SmsCampaigns => marketing::sms_campaigns(),
            ScreenId::EmailCampaigns => marketing::email_campaigns(),
            ScreenId::PushNotifications => marketing::push_notifications(),
            ScreenId::WhatsAppCampaigns => marketing::whatsapp_campaigns(),
            ScreenId::Affiliates => marketing::affiliates(),
            ScreenId::Segments => audience::segments(),
            ScreenId::Audiences => audience::audiences(),
            ScreenId::Journeys => audience::journeys(),
            ScreenId::Automations => audience::automations(),
            ScreenId::Loyalty => audience::loyalty(),
            ScreenId::Videos => content::videos(),
            ScreenId::Forms => content::forms(),
            ScreenId::LiveChat => content::live_chat(),
            ScreenId::TaxRates => finance::tax_rates(),
            ScreenId::TaxRules => finance::tax_rules(),
            ScreenId::PaymentMethods => finance::payment_methods(),
            ScreenId::PaymentGateways => finance::payment_gateways(),
            ScreenId::Transactions => finance::transactions(),
            ScreenId::AiFeatures => platform::ai_features(),
            ScreenId::AiTasks => platform::ai_tasks(),
            ScreenId::ApiKeys => platform::api_keys(),
            ScreenId::Settings => platform::settings(),
        }
    }
}

pub fn catalog() -> Vec<ResourceDescriptor> {
    ScreenId::ALL.into_iter().map(ScreenId::descriptor).collect()
}

/// Navigation sections in display order, each with its screens.
pub fn sections() -> Vec<(&'static str, Vec<ScreenId>)> {
    let mut sections: Vec<(&'static str, Vec<ScreenId>)> = Vec::new();
    for id in ScreenId::ALL {
        match sections.iter_mut().find(|(name, _)| *name == id.section()) {
            Some((_, screens)) => screens.push(id),
            None => sections.push((id.section(), vec![id])),
        }
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::validate_draft;
    use crate::metrics;
    use std::collections::HashSet;

    #[test]
    fn keys_paths_and_endpoints_are_unique() {
        let catalog = catalog();
        let keys: HashSet<_> = catalog.iter().map(|d| d.key.clone()).collect();
        let endpoints: HashSet<_> = catalog.iter().map(|d| d.endpoint.clone()).collect();
        let paths: HashSet<_> = ScreenId::ALL.iter().map(|id| id.path()).collect();
        assert_eq!(keys.len(), ScreenId::ALL.len());
        assert_eq!(endpoints.len(), ScreenId::ALL.len());
        assert_eq!(paths.len(), ScreenId::ALL.len());
    }

    #[test]
    fn every_screen_has_sample_rows_and_finite_metrics() {
        for descriptor in catalog() {
            let rows = descriptor.sample_rows();
            assert!(!rows.is_empty(), "{} has no sample rows", descriptor.key);
            assert!(rows.iter().all(|r| r.id().is_some()), "{} rows need ids", descriptor.key);
            for value in metrics::compute(&rows, &descriptor.metrics) {
                assert!(value.value.is_finite(), "{} {}", descriptor.key, value.key);
            }
        }
    }

    #[test]
    fn blank_drafts_only_fail_on_required_fields() {
        for descriptor in catalog() {
            let errors = validate_draft(&descriptor.fields, &descriptor.blank_draft());
            for key in errors.keys() {
                let field = descriptor.field(key).unwrap();
                assert!(field.required, "{}.{} rejected a default", descriptor.key, key);
            }
        }
    }

    #[test]
    fn lookups_round_trip() {
        assert_eq!(ScreenId::from_path("/loyalty-program"), Some(ScreenId::Loyalty));
        assert_eq!(ScreenId::from_key("orders"), Some(ScreenId::Orders));
        assert_eq!(ScreenId::from_path("/nope"), None);
        let sections = sections();
        assert_eq!(sections.first().map(|(name, _)| *name), Some("Overview"));
        assert_eq!(sections.len(), 7);
    }
}
