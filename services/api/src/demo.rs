use std::sync::Arc;

use clap::Args;

use homeward::error::AppError;
use homeward::workflows::adoption::{AdoptionListQuery, AdoptionWorkflowService};
use homeward::workflows::catalog::{CatalogQuery, Gender, NewPet, PetCatalogService, Species};
use homeward::workflows::identity::Role;
use homeward::workflows::paging::PageRequest;

use crate::infra::{InMemoryAccounts, InMemoryAdoptionRepository, InMemoryPetRepository};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Page size used for the catalog browsing portion of the demo.
    #[arg(long, default_value_t = 2)]
    pub(crate) page_size: u32,
    /// Skip the catalog browsing portion of the demo.
    #[arg(long)]
    pub(crate) skip_catalog: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        page_size,
        skip_catalog,
    } = args;

    println!("Pet adoption workflow demo");

    let accounts = Arc::new(InMemoryAccounts::default());
    let (admin, _) = accounts.register("Shelter Admin", "admin@homeward.local", Role::Admin);
    let (dana, _) = accounts.register("Dana Whitfield", "dana@example.com", Role::User);
    let (riley, _) = accounts.register("Riley Otis", "riley@example.com", Role::User);

    let pets = Arc::new(InMemoryPetRepository::default());
    let adoptions = Arc::new(InMemoryAdoptionRepository::default());
    let adoption_service = Arc::new(AdoptionWorkflowService::new(
        adoptions.clone(),
        pets.clone(),
        accounts.clone(),
    ));
    let catalog_service = Arc::new(PetCatalogService::new(pets, adoptions, accounts));

    println!("\nCatalog setup");
    let listings = [
        ("Willow", Species::Dog, "Greyhound", 4, Gender::Female),
        ("Byron", Species::Cat, "Maine Coon", 2, Gender::Male),
        ("Clementine", Species::Rabbit, "Holland Lop", 1, Gender::Female),
    ];
    let mut created = Vec::new();
    for (name, species, breed, age, gender) in listings {
        let pet = catalog_service.create(
            NewPet {
                name: name.to_string(),
                species,
                breed: breed.to_string(),
                age,
                gender,
                description: None,
                photo: None,
            },
            &admin,
        )?;
        println!(
            "- Listed {} ({} {}, age {}) as {}",
            pet.name,
            pet.breed,
            pet.species.label(),
            pet.age,
            pet.id.0
        );
        created.push(pet);
    }

    println!("\nApplication intake");
    let willow = &created[0];
    let dana_application = adoption_service.submit(&willow.id, &dana)?;
    println!(
        "- {} applied for {} -> {} ({})",
        dana.name,
        willow.name,
        dana_application.id.0,
        dana_application.status.label()
    );
    let riley_application = adoption_service.submit(&willow.id, &riley)?;
    println!(
        "- {} applied for {} -> {} ({})",
        riley.name,
        willow.name,
        riley_application.id.0,
        riley_application.status.label()
    );
    if let Err(err) = adoption_service.submit(&willow.id, &dana) {
        println!("- Duplicate submission blocked: {err}");
    }

    println!("\nReview");
    let approved = adoption_service.approve(
        &dana_application.id,
        &admin,
        Some("Fenced yard verified".to_string()),
    )?;
    println!(
        "- Approved {} -> pet {} is now {}",
        approved.id.0,
        approved.pet.name,
        approved.pet.status.label()
    );

    for view in adoption_service.applications_for_user(&riley.user_id)? {
        let note = view.notes.as_deref().unwrap_or("none");
        println!(
            "- {}'s application {} is {} (note: {})",
            riley.name,
            view.id.0,
            view.status.label(),
            note
        );
    }

    if let Err(err) = adoption_service.reject(&riley_application.id, &admin, None) {
        println!("- Late rejection blocked: {err}");
    }

    match serde_json::to_string_pretty(&approved) {
        Ok(json) => println!("\nApproved application payload:\n{json}"),
        Err(err) => println!("\nApproved application payload unavailable: {err}"),
    }

    let listing = adoption_service.list_all(AdoptionListQuery::default())?;
    println!(
        "\nAdmin listing: {} applications across {} page(s)",
        listing.pagination.total, listing.pagination.pages
    );
    for view in &listing.data {
        println!(
            "- {} | {} | applicant {} | {}",
            view.id.0,
            view.pet.name,
            view.applicant.name,
            view.status.label()
        );
    }

    if skip_catalog {
        return Ok(());
    }

    println!("\nPublic catalog browse (page size {page_size})");
    let mut page = 1_u32;
    loop {
        let query = CatalogQuery {
            page: PageRequest::new(Some(page), Some(page_size))
                .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?,
            ..CatalogQuery::default()
        };
        let result = catalog_service.list(query, None)?;
        println!(
            "Page {}/{} ({} available pets total)",
            result.pagination.page,
            result.pagination.pages.max(1),
            result.pagination.total
        );
        for pet in &result.data {
            println!(
                "- {} | {} {} | age {} | {}",
                pet.id.0,
                pet.breed,
                pet.species.label(),
                pet.age,
                pet.status.label()
            );
        }
        if u64::from(page) >= result.pagination.pages {
            break;
        }
        page += 1;
    }

    let removed = &created[2];
    catalog_service.delete(&removed.id)?;
    println!(
        "\nDelisted {} along with any applications referencing it",
        removed.name
    );

    Ok(())
}
