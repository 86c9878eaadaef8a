use crate::application::dto::configs::Pattern;
use crate::application::ports::pattern_repository::PatternRepository;

pub struct ListPatterns<'a, R: PatternRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: PatternRepository + ?Sized> ListPatterns<'a, R> {
    pub async fn execute(&self) -> anyhow::Result<Vec<Pattern>> {
        self.repo.list_all().await
    }
}
