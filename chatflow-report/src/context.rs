//! Template contexts: serializable rendering payloads built from a [`Crm`].

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use chatflow_core::{
    query::{self, StatusCounts},
    AgentDirectory, AgentId, AgentPresence, ContactId, ContactStatus, Crm, NotFound,
};

use crate::error::ReportError;

/// Generation metadata shared by every report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaCtx {
    pub date: String,
    pub time: String,
    /// `YYYY-MM-DD`, used for file names.
    pub iso_date: String,
    pub version: String,
}

impl MetaCtx {
    pub fn at(generated_at: DateTime<Local>) -> Self {
        Self {
            date: generated_at.format("%B %-d, %Y").to_string(),
            time: generated_at.format("%H:%M").to_string(),
            iso_date: generated_at.format("%Y-%m-%d").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewCtx {
    pub resolved: u32,
    pub pending: u32,
    /// One decimal place, e.g. `93.4`.
    pub avg_satisfaction: String,
    pub online_agents: usize,
    pub total_agents: usize,
    pub products_sold: u64,
    pub agent_revenue: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRowCtx {
    pub key: String,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRowCtx {
    pub product: String,
    pub units: u32,
    pub revenue: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSalesRowCtx {
    pub agent: String,
    pub sales: u32,
    pub revenue: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceRowCtx {
    pub agent: String,
    pub resolved: u32,
    pub pending: u32,
    pub satisfaction: u8,
}

/// Payload for the general report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryContext {
    pub meta: MetaCtx,
    pub overview: OverviewCtx,
    /// Statuses with at least one contact, in display order.
    pub status_distribution: Vec<StatusRowCtx>,
    pub products: Vec<ProductRowCtx>,
    pub agent_sales: Vec<AgentSalesRowCtx>,
    pub performance: Vec<PerformanceRowCtx>,
}

impl SummaryContext {
    pub fn from_crm(crm: &Crm, generated_at: DateTime<Local>) -> Self {
        let analytics = &crm.analytics;
        let agent_name = |id: &AgentId| {
            crm.registry
                .directory()
                .resolve(id)
                .map(|a| a.name.clone())
                .unwrap_or_else(|| id.0.clone())
        };

        let resolved = analytics.agent_performance.iter().map(|p| p.resolved).sum();
        let pending = analytics.agent_performance.iter().map(|p| p.pending).sum();
        let avg_satisfaction = if analytics.agent_performance.is_empty() {
            0.0
        } else {
            analytics
                .agent_performance
                .iter()
                .map(|p| f64::from(p.satisfaction))
                .sum::<f64>()
                / analytics.agent_performance.len() as f64
        };

        let presence = query::presence_counts(crm.agents());
        let counts = StatusCounts::of(crm.registry.contacts());
        let status_distribution = ContactStatus::all()
            .iter()
            .filter(|s| counts.get(**s) > 0)
            .map(|s| StatusRowCtx {
                key: s.key().to_string(),
                label: s.label().to_string(),
                count: counts.get(*s),
            })
            .collect();

        SummaryContext {
            meta: MetaCtx::at(generated_at),
            overview: OverviewCtx {
                resolved,
                pending,
                avg_satisfaction: format!("{avg_satisfaction:.1}"),
                online_agents: presence.get(&AgentPresence::Online).copied().unwrap_or(0),
                total_agents: crm.agents().len(),
                products_sold: analytics
                    .product_sales
                    .iter()
                    .map(|p| u64::from(p.units))
                    .sum(),
                agent_revenue: analytics.agent_sales.iter().map(|s| s.revenue).sum(),
            },
            status_distribution,
            products: analytics
                .product_sales
                .iter()
                .map(|p| ProductRowCtx {
                    product: p.product.clone(),
                    units: p.units,
                    revenue: p.revenue,
                })
                .collect(),
            agent_sales: analytics
                .agent_sales
                .iter()
                .map(|s| AgentSalesRowCtx {
                    agent: agent_name(&s.agent),
                    sales: s.sales,
                    revenue: s.revenue,
                })
                .collect(),
            performance: analytics
                .agent_performance
                .iter()
                .map(|p| PerformanceRowCtx {
                    agent: agent_name(&p.agent),
                    resolved: p.resolved,
                    pending: p.pending,
                    satisfaction: p.satisfaction,
                })
                .collect(),
        }
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, ReportError> {
        tera::Context::from_serialize(self).map_err(ReportError::from)
    }
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactCtx {
    pub id: String,
    pub name: String,
    pub company: String,
    pub phone: String,
    pub email: String,
    pub country: String,
    pub status: String,
    /// Agent display name, or `Unassigned`.
    pub agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageCtx {
    pub sender: String,
    pub sender_label: String,
    pub sender_name: String,
    pub time: String,
    pub content: String,
}

/// Payload for a single-contact conversation export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationContext {
    pub meta: MetaCtx,
    pub contact: ContactCtx,
    pub message_count: usize,
    pub messages: Vec<MessageCtx>,
}

impl ConversationContext {
    pub fn from_crm(
        crm: &Crm,
        contact_id: &ContactId,
        generated_at: DateTime<Local>,
    ) -> Result<Self, ReportError> {
        let contact = crm
            .registry
            .get(contact_id)
            .ok_or_else(|| NotFound::Contact(contact_id.clone()))?;
        let agent = crm
            .registry
            .assigned_agent(contact)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| "Unassigned".to_string());

        let messages: Vec<MessageCtx> = query::transcript(&crm.messages, contact_id)
            .into_iter()
            .map(|m| MessageCtx {
                sender: format!("{:?}", m.sender).to_lowercase(),
                sender_label: m.sender.label().to_string(),
                sender_name: m.sender_name.clone(),
                time: m.timestamp.format("%H:%M").to_string(),
                content: m.content.clone(),
            })
            .collect();

        Ok(ConversationContext {
            meta: MetaCtx::at(generated_at),
            contact: ContactCtx {
                id: contact.id.0.clone(),
                name: contact.name.clone(),
                company: contact.company.clone(),
                phone: contact.phone.clone(),
                email: contact.email.clone(),
                country: contact.country.clone(),
                status: contact.status.label().to_string(),
                agent,
            },
            message_count: messages.len(),
            messages,
        })
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, ReportError> {
        tera::Context::from_serialize(self).map_err(ReportError::from)
    }
}
