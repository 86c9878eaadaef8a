use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct InformationCardRow {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub color: u32,
    pub icon_id: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct FaqRow {
    pub id: u32,
    pub question: String,
    pub answer: String,
}

/// Information cards and frequently asked questions of the home page.
#[async_trait]
pub trait HomeRepository: Send + Sync {
    async fn list_cards(&self, version: u32) -> anyhow::Result<Vec<InformationCardRow>>;
    async fn insert_card(
        &self,
        version: u32,
        order: u16,
        card: &InformationCardRow,
    ) -> anyhow::Result<u32>;
    async fn update_card(&self, order: u16, card: &InformationCardRow) -> anyhow::Result<()>;
    async fn delete_cards(&self, ids: &[u32]) -> anyhow::Result<()>;

    async fn list_faq(&self, version: u32) -> anyhow::Result<Vec<FaqRow>>;
    async fn insert_faq(&self, version: u32, order: u16, faq: &FaqRow) -> anyhow::Result<u32>;
    async fn update_faq(&self, order: u16, faq: &FaqRow) -> anyhow::Result<()>;
    async fn delete_faq(&self, ids: &[u32]) -> anyhow::Result<()>;
}
