use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::application::dto::users::{Admin, NewAdmin};
use crate::application::errors::ApiError;
use crate::application::ports::user_repository::UserRepository;
use crate::application::use_cases::admins::create_admin::CreateAdmin;

/// PoCoPI backend: serves the HTTP API unless told otherwise.
#[derive(Parser, Debug, Default)]
#[command(name = "pocopi-api", version, about)]
pub struct Cli {
    /// Prompt for the credentials of a new administrator, create it and exit
    #[arg(long)]
    pub create_admin: bool,
}

/// Asks for a username and password until the admin validates. Gives up when input ends.
pub async fn create_admin_interactive<R, W>(
    repo: &dyn UserRepository,
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<Admin>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let uc = CreateAdmin { repo };
    loop {
        let username = prompt(input, output, "Username: ").await?;
        let password = prompt(input, output, "Password: ").await?;
        match uc
            .execute(&NewAdmin {
                username,
                password,
            })
            .await
        {
            Ok(admin) => {
                output
                    .write_all(format!("Admin {} created\n", admin.username).as_bytes())
                    .await?;
                output.flush().await?;
                return Ok(admin);
            }
            Err(ApiError::Invalid { message, errors }) => {
                let mut text = format!("{message}\n");
                for e in errors {
                    text.push_str(&format!("  {}: {}\n", e.field, e.message));
                }
                output.write_all(text.as_bytes()).await?;
            }
            Err(other) => return Err(anyhow::anyhow!(other.to_string())),
        }
    }
}

async fn prompt<R, W>(input: &mut R, output: &mut W, label: &str) -> anyhow::Result<String>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output.write_all(label.as_bytes()).await?;
    output.flush().await?;
    let mut line = String::new();
    if input.read_line(&mut line).await? == 0 {
        anyhow::bail!("input closed before an admin was created");
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::MemoryStore;
    use crate::domain::users::user::Role;

    #[test]
    fn serves_by_default() {
        let cli = Cli::try_parse_from(["pocopi-api"]).unwrap();
        assert!(!cli.create_admin);
        let cli = Cli::try_parse_from(["pocopi-api", "--create-admin"]).unwrap();
        assert!(cli.create_admin);
    }

    #[tokio::test]
    async fn retries_until_the_admin_is_valid() {
        let store = MemoryStore::default();
        let mut input: &[u8] = b"bad name\nshort\nroot\nlong-enough-pass\n";
        let mut output = Vec::new();

        let admin = create_admin_interactive(&store, &mut input, &mut output)
            .await
            .unwrap();
        assert_eq!(admin.username, "root");
        assert_eq!(store.lock().users[0].role, Role::Admin);

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Invalid admin"));
        assert!(text.ends_with("Admin root created\n"));
    }

    #[tokio::test]
    async fn stops_when_input_ends() {
        let store = MemoryStore::default();
        let mut input: &[u8] = b"root\n";
        let mut output = Vec::new();
        assert!(
            create_admin_interactive(&store, &mut input, &mut output)
                .await
                .is_err()
        );
        assert!(store.lock().users.is_empty());
    }
}
