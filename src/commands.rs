//! Entity sub-commands
//!
//! Every handler receives the current [`Session`]; nothing here reads the session file.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use effectif_auth::Session;
use effectif_client::ApiClient;
use effectif_proto::{
    by_category, search_members, search_personnes, Competence, Groupement, GroupementRef,
    GroupementUpdate, Habilitation, MatrixEntry, NewPersonne, Note, Personne, PersonneSummary,
    PersonneUpdate, Team, TeamAssignment, TeamUpdate, User, UNKNOWN_NAME, UNKNOWN_SURNAME,
};
use effectif_store::LocalStore;
use tracing::{debug, info};

use crate::matrix_draft::MatrixDraft;

/// Where teams, users and groupements are read from and written to
pub enum DataSource {
    Remote(ApiClient),
    Local(LocalStore),
}

impl DataSource {
    fn remote(&self, what: &str) -> Result<&ApiClient> {
        match self {
            DataSource::Remote(client) => Ok(client),
            DataSource::Local(store) => bail!(
                "{} requires the backend; unset --data-dir (currently {:?})",
                what,
                store.data_dir()
            ),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum TeamCommands {
    /// List all teams
    List,
    /// Show a team and its members
    Show {
        /// Team code
        code: String,
    },
    /// Create a team
    Create {
        /// Team code (immutable)
        code: String,
        /// Team name
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Groupement code
        #[arg(long)]
        groupement: Option<String>,
    },
    /// Update the mutable fields of a team
    Update {
        /// Team code
        code: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Groupement code (empty to detach)
        #[arg(long)]
        groupement: Option<String>,
    },
    /// Delete a team (members keep their team reference)
    Delete {
        /// Team code
        code: String,
    },
    /// Assign a personne to a team
    AddMember {
        /// Team code
        code: String,
        /// Personne identifier
        identifier: String,
    },
    /// Detach a personne from its team
    RemoveMember {
        /// Personne identifier
        identifier: String,
    },
    /// List personnes that can join a team
    Available {
        /// Team code
        code: String,
        /// Filter on name, surname, identifier or role
        #[arg(long)]
        search: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum GroupementCommands {
    /// List all groupements
    List,
    /// Show a groupement
    Show {
        /// Groupement code
        code: String,
    },
    /// Create a groupement
    Create {
        /// Groupement code (immutable)
        code: String,
        /// Label
        label: String,
        /// Parent direction
        #[arg(long)]
        direction: Option<String>,
    },
    /// Update the label and direction of a groupement
    Update {
        /// Groupement code
        code: String,
        /// New label
        label: String,
        /// Parent direction
        #[arg(long)]
        direction: Option<String>,
    },
    /// Delete a groupement
    Delete {
        /// Groupement code
        code: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum PersonneCommands {
    /// List personnes
    List {
        /// Filter on identifier, name, surname, role or team
        #[arg(long)]
        search: Option<String>,
    },
    /// Show a personne
    Show {
        /// Personne identifier
        identifier: String,
    },
    /// Create a personne
    Create {
        /// Identifier (immutable, also the user matricule)
        identifier: String,
        /// Family name
        name: String,
        /// Given name
        surname: String,
        #[arg(long)]
        role: Option<String>,
        /// Team code
        #[arg(long)]
        team: Option<String>,
    },
    /// Update the mutable fields of a personne
    Update {
        /// Personne identifier
        identifier: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        surname: Option<String>,
        #[arg(long)]
        role: Option<String>,
        /// Team code, or "none" to leave the team
        #[arg(long)]
        team: Option<String>,
    },
    /// Delete a personne
    Delete {
        /// Personne identifier
        identifier: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// List users with their habilitations
    List,
    /// Show a user
    Show {
        /// User matricule
        matricule: String,
    },
    /// Create or update a user's habilitations
    Save {
        /// User matricule
        matricule: String,
        /// Habilitation code (repeatable)
        #[arg(long = "habilitation", short = 'H')]
        habilitations: Vec<String>,
        /// Family name (local data directory only)
        #[arg(long)]
        name: Option<String>,
        /// Given name (local data directory only)
        #[arg(long)]
        surname: Option<String>,
    },
    /// Delete a user
    Delete {
        /// User matricule
        matricule: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum MatrixCommands {
    /// Set the level of a personne for a competence
    Set {
        /// Personne matricule
        matricule: String,
        /// Competence id
        competence: String,
        /// Level from 1 (Débutant) to 4 (Expert)
        level: u8,
        /// Competence label (defaults to the id)
        #[arg(long)]
        label: Option<String>,
        /// Competence category
        #[arg(long)]
        category: Option<String>,
    },
    /// Remove a level
    Remove {
        /// Personne matricule
        matricule: String,
        /// Competence id
        competence: String,
    },
    /// Show the matrix grouped by category
    Show,
    /// Show the level scale
    Scale,
}

fn print_team(team: &Team) {
    println!("  {} - {}", team.code, team.name);
    if !team.description.is_empty() {
        println!("    Description: {}", team.description);
    }
    if let Some(groupement) = &team.groupement {
        println!("    Groupement: {} ({})", groupement.name, groupement.id);
    }
}

fn print_team_members(team: &Team) {
    if team.members.is_empty() {
        println!("    No members");
        return;
    }
    println!("    Members ({})", team.members.len());
    for member in &team.members {
        println!("      {} {}", member.matricule, member.display_name());
    }
}

fn print_groupement(groupement: &Groupement) {
    print!("  {} - {}", groupement.code, groupement.label);
    if let Some(direction) = &groupement.direction {
        print!(" ({})", direction);
    }
    println!();
}

fn print_personne(personne: &Personne) {
    print!(
        "  {} {} {}",
        personne.identifier, personne.name, personne.surname
    );
    if let Some(role) = &personne.role {
        print!(", {}", role);
    }
    if let Some(team) = &personne.team {
        print!(" [{}]", team.name.as_deref().unwrap_or(&team.code));
    }
    println!();
}

fn print_user(user: &User) {
    let codes = user.habilitation_codes();
    println!(
        "  {} {} {} [{}]",
        user.matricule,
        user.name,
        user.surname,
        codes.join(", ")
    );
}

fn local_groupement_ref(store: &LocalStore, code: &str) -> Result<GroupementRef> {
    let groupement = store
        .groupements
        .get(code)
        .context(format!("Unknown groupement '{}'", code))?;
    Ok(GroupementRef {
        id: groupement.code,
        name: groupement.label,
    })
}

pub async fn handle_team_command(
    command: TeamCommands,
    source: &DataSource,
    session: &Session,
) -> Result<()> {
    debug!("Team command by {}", session.matricule());

    match (command, source) {
        (TeamCommands::List, DataSource::Remote(client)) => {
            let teams = client.teams().list().await?;
            println!("Teams ({})", teams.len());
            for team in &teams {
                print_team(team);
            }
        }
        (TeamCommands::List, DataSource::Local(store)) => {
            let teams = store.teams.list()?;
            println!("Teams ({})", teams.len());
            for team in &teams {
                print_team(team);
            }
        }
        (TeamCommands::Show { code }, source) => {
            let team = match source {
                DataSource::Remote(client) => client.teams().get_by_key(&code).await?,
                DataSource::Local(store) => store.teams.get(&code)?,
            };
            print_team(&team);
            print_team_members(&team);
        }
        (
            TeamCommands::Create {
                code,
                name,
                description,
                groupement,
            },
            source,
        ) => {
            let mut team = Team::new(code, name).with_description(description.unwrap_or_default());
            match source {
                DataSource::Remote(client) => {
                    if let Some(groupement) = groupement {
                        team = team.with_groupement(groupement);
                    }
                    let created = client.teams().create(&team).await?;
                    println!("✅ Team '{}' created", created.code);
                }
                DataSource::Local(store) => {
                    if let Some(groupement) = groupement {
                        team.groupement = Some(local_groupement_ref(store, &groupement)?);
                    }
                    store.teams.save(team.clone())?;
                    println!("✅ Team '{}' saved", team.code);
                }
            }
        }
        (
            TeamCommands::Update {
                code,
                name,
                description,
                groupement,
            },
            source,
        ) => match source {
            DataSource::Remote(client) => {
                let update = TeamUpdate {
                    name,
                    description,
                    groupement_code: groupement,
                };
                client.teams().update(&code, &update).await?;
                println!("✅ Team '{}' updated", code);
            }
            DataSource::Local(store) => {
                let mut team = store.teams.get(&code)?;
                if let Some(name) = name {
                    team.name = name;
                }
                if let Some(description) = description {
                    team.description = description;
                }
                match groupement.as_deref() {
                    None => {}
                    Some("") => team.groupement = None,
                    Some(code) => team.groupement = Some(local_groupement_ref(store, code)?),
                }
                store.teams.save(team)?;
                println!("✅ Team '{}' updated", code);
            }
        },
        (TeamCommands::Delete { code }, source) => {
            match source {
                DataSource::Remote(client) => client.teams().delete(&code).await?,
                DataSource::Local(store) => store.teams.delete(&code)?,
            }
            println!("✅ Team '{}' deleted", code);
        }
        (TeamCommands::AddMember { code, identifier }, source) => {
            let client = source.remote("Team membership")?;
            client.teams().add_member(&code, &identifier).await?;
            println!("✅ {} joined team '{}'", identifier, code);
        }
        (TeamCommands::RemoveMember { identifier }, source) => {
            let client = source.remote("Team membership")?;
            client.teams().remove_member(&identifier).await?;
            println!("✅ {} left their team", identifier);
        }
        (TeamCommands::Available { code, search }, source) => {
            let client = source.remote("Team membership")?;
            let candidates = client.teams().available_members(&code).await?;
            let matches = search_members(&candidates, search.as_deref().unwrap_or(""));
            println!("Available for '{}' ({})", code, matches.len());
            for personne in matches {
                print_personne(personne);
            }
        }
    }

    Ok(())
}

pub async fn handle_groupement_command(
    command: GroupementCommands,
    source: &DataSource,
    session: &Session,
) -> Result<()> {
    debug!("Groupement command by {}", session.matricule());

    match command {
        GroupementCommands::List => {
            let groupements = match source {
                DataSource::Remote(client) => client.groupements().list().await?,
                DataSource::Local(store) => store.groupements.list()?,
            };
            println!("Groupements ({})", groupements.len());
            for groupement in &groupements {
                print_groupement(groupement);
            }
        }
        GroupementCommands::Show { code } => {
            let groupement = match source {
                DataSource::Remote(client) => client.groupements().get_by_key(&code).await?,
                DataSource::Local(store) => store.groupements.get(&code)?,
            };
            print_groupement(&groupement);
        }
        GroupementCommands::Create {
            code,
            label,
            direction,
        } => {
            let groupement = Groupement {
                code,
                label,
                direction,
            };
            match source {
                DataSource::Remote(client) => {
                    client.groupements().create(&groupement).await?;
                }
                DataSource::Local(store) => {
                    store.groupements.save(groupement.clone())?;
                }
            }
            println!("✅ Groupement '{}' created", groupement.code);
        }
        GroupementCommands::Update {
            code,
            label,
            direction,
        } => {
            match source {
                DataSource::Remote(client) => {
                    let update = GroupementUpdate { label, direction };
                    client.groupements().update(&code, &update).await?;
                }
                DataSource::Local(store) => {
                    let mut groupement = store.groupements.get(&code)?;
                    groupement.label = label;
                    groupement.direction = direction;
                    store.groupements.save(groupement)?;
                }
            }
            println!("✅ Groupement '{}' updated", code);
        }
        GroupementCommands::Delete { code } => {
            match source {
                DataSource::Remote(client) => client.groupements().delete(&code).await?,
                DataSource::Local(store) => store.groupements.delete(&code)?,
            }
            println!("✅ Groupement '{}' deleted", code);
        }
    }

    Ok(())
}

pub async fn handle_personne_command(
    command: PersonneCommands,
    source: &DataSource,
    session: &Session,
) -> Result<()> {
    debug!("Personne command by {}", session.matricule());
    let personnes = source.remote("Personnes")?.personnes();

    match command {
        PersonneCommands::List { search } => {
            let all = personnes.list().await?;
            let matches = search_personnes(&all, search.as_deref().unwrap_or(""));
            println!("Personnes ({})", matches.len());
            for personne in matches {
                print_personne(personne);
            }
        }
        PersonneCommands::Show { identifier } => {
            let personne = personnes.get_by_key(&identifier).await?;
            print_personne(&personne);
        }
        PersonneCommands::Create {
            identifier,
            name,
            surname,
            role,
            team,
        } => {
            let created = personnes
                .create(&NewPersonne {
                    identifier,
                    name,
                    surname,
                    role,
                    team_code: team,
                })
                .await?;
            println!("✅ Personne '{}' created", created.identifier);
        }
        PersonneCommands::Update {
            identifier,
            name,
            surname,
            role,
            team,
        } => {
            let update = PersonneUpdate {
                name,
                surname,
                role,
                team: TeamAssignment::from_form(team.as_deref()),
            };
            personnes.update(&identifier, &update).await?;
            println!("✅ Personne '{}' updated", identifier);
        }
        PersonneCommands::Delete { identifier } => {
            personnes.delete(&identifier).await?;
            println!("✅ Personne '{}' deleted", identifier);
        }
    }

    Ok(())
}

pub async fn handle_user_command(
    command: UserCommands,
    source: &DataSource,
    session: &Session,
) -> Result<()> {
    debug!("User command by {}", session.matricule());

    match command {
        UserCommands::List => {
            let users = match source {
                DataSource::Remote(client) => client.users().list().await?,
                DataSource::Local(store) => store.users.list()?,
            };
            println!("Users ({})", users.len());
            for user in &users {
                print_user(user);
            }
        }
        UserCommands::Show { matricule } => {
            let user = match source {
                DataSource::Remote(client) => client.users().get_by_key(&matricule).await?,
                DataSource::Local(store) => store.users.get(&matricule)?,
            };
            print_user(&user);
        }
        UserCommands::Save {
            matricule,
            habilitations,
            name,
            surname,
        } => {
            let habilitations: Vec<Habilitation> =
                habilitations.into_iter().map(Habilitation::new).collect();

            let users = match source {
                DataSource::Remote(client) => {
                    let user = User {
                        matricule,
                        name: name.unwrap_or_default(),
                        surname: surname.unwrap_or_default(),
                        habilitations,
                    };
                    client.users().save(&user).await?
                }
                DataSource::Local(store) => {
                    let existing = match store.users.get(&matricule) {
                        Ok(user) => Some(user),
                        Err(e) if e.is_not_found() => None,
                        Err(e) => return Err(e.into()),
                    };
                    let user = User {
                        name: name
                            .or_else(|| existing.as_ref().map(|u| u.name.clone()))
                            .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
                        surname: surname
                            .or_else(|| existing.as_ref().map(|u| u.surname.clone()))
                            .unwrap_or_else(|| UNKNOWN_SURNAME.to_string()),
                        matricule,
                        habilitations,
                    };
                    store.users.save(user)?
                }
            };

            println!("✅ User saved");
            println!("Users ({})", users.len());
            for user in &users {
                print_user(user);
            }
        }
        UserCommands::Delete { matricule } => {
            match source {
                DataSource::Remote(client) => client.users().delete(&matricule).await?,
                DataSource::Local(store) => store.users.delete(&matricule)?,
            }
            println!("✅ User '{}' deleted", matricule);
        }
    }

    Ok(())
}

/// Summary of the personne being rated, from the draft if known there
async fn personne_summary(
    draft: &effectif_proto::CompetenceMatrix,
    source: &DataSource,
    matricule: &str,
) -> Result<PersonneSummary> {
    if let Some(known) = draft.personnes().into_iter().find(|p| p.matricule == matricule) {
        return Ok(known.clone());
    }
    let client = source.remote("Rating a new personne")?;
    Ok(client.personnes().get_by_key(matricule).await?.summary())
}

pub async fn handle_matrix_command(
    command: MatrixCommands,
    draft: &MatrixDraft,
    source: &DataSource,
    session: &Session,
) -> Result<()> {
    debug!("Matrix command by {}", session.matricule());

    match command {
        MatrixCommands::Set {
            matricule,
            competence,
            level,
            label,
            category,
        } => {
            let note = Note::from_value(level)
                .context(format!("Invalid level {}: expected 1 to 4", level))?;
            let mut matrix = draft.load()?;

            let personne = personne_summary(&matrix, source, &matricule).await?;
            let known = matrix
                .competences()
                .into_iter()
                .find(|c| c.id == competence)
                .cloned();
            let competence = Competence {
                label: label
                    .or_else(|| known.as_ref().map(|c| c.label.clone()))
                    .unwrap_or_else(|| competence.clone()),
                description: known.as_ref().and_then(|c| c.description.clone()),
                category: category.or_else(|| known.as_ref().and_then(|c| c.category.clone())),
                id: competence,
            };

            info!(
                "Setting {} / {} to {}",
                personne.matricule, competence.id, note.id
            );
            println!(
                "✅ {} rated {} ({}) on {}",
                personne.display_name(),
                note.id,
                note.label,
                competence.label
            );
            matrix.upsert(MatrixEntry {
                personne,
                competence,
                note,
            });
            draft.save(&matrix)?;
        }
        MatrixCommands::Remove {
            matricule,
            competence,
        } => {
            let mut matrix = draft.load()?;
            if matrix.remove(&matricule, &competence).is_none() {
                bail!("No level recorded for {} on '{}'", matricule, competence);
            }
            draft.save(&matrix)?;
            println!("✅ Level removed");
        }
        MatrixCommands::Show => {
            let matrix = draft.load()?;
            if matrix.is_empty() {
                println!("Matrix draft is empty ({:?})", draft.path());
                return Ok(());
            }

            for (category, competences) in by_category(matrix.competences()) {
                println!("{}", category);
                for competence in competences {
                    println!("  {}", competence.label);
                    for personne in matrix.personnes() {
                        if let Some(note) = matrix.level(&personne.matricule, &competence.id) {
                            println!(
                                "    {} {}: {} ({})",
                                personne.matricule,
                                personne.display_name(),
                                note.id,
                                note.label
                            );
                        }
                    }
                }
            }
        }
        MatrixCommands::Scale => {
            for note in Note::scale() {
                println!("  {} {} {}", note.value, note.id, note.label);
            }
        }
    }

    Ok(())
}
