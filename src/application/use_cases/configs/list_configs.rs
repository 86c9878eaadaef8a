use crate::application::dto::configs::ConfigPreview;
use crate::application::use_cases::ConfigPorts;

pub struct ListConfigs<'a> {
    pub ports: ConfigPorts<'a>,
}

impl<'a> ListConfigs<'a> {
    pub async fn execute(&self) -> anyhow::Result<Vec<ConfigPreview>> {
        let rows = self.ports.configs.list().await?;
        let with_data = self.ports.configs.versions_with_user_data().await?;
        let icons = self.ports.images.load(rows.iter().map(|r| r.icon_id)).await?;
        Ok(rows
            .into_iter()
            .map(|r| ConfigPreview {
                version: r.version,
                icon: r.icon_id.and_then(|id| icons.get(&id).cloned()),
                can_delete: !r.active && !with_data.contains(&r.version),
                active: r.active,
                title: r.title,
                subtitle: r.subtitle,
                description: r.description,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::Fixture;
    use crate::domain::users::user::Role;

    #[tokio::test]
    async fn previews_flag_deletable_versions() {
        let fx = Fixture::default();
        let v2 = fx.store.add_config();
        let v3 = fx.store.add_config();
        let group = fx.store.add_group(v3, "g", 100, &[&[&[true]]]);
        let user = fx.store.add_user("ana", Role::User, "x");
        fx.store.start_attempt(user.id, group);

        let previews = ListConfigs { ports: fx.ports() }.execute().await.unwrap();
        let flags: Vec<(u32, bool, bool)> = previews
            .iter()
            .map(|p| (p.version, p.active, p.can_delete))
            .collect();
        assert_eq!(flags, vec![(1, true, false), (v2, false, true), (v3, false, false)]);
    }
}
