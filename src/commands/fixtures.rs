//! Shared setup for the command tests

use std::sync::Arc;

use uuid::Uuid;

use super::DomainLogic;
use crate::{
    adapters::{
        catalog::memory::MemoryCatalog, database::memory::MemoryDatabase,
        image::memory::MemoryImageStore, member::memory::MemoryMemberDirectory,
    },
    commands::create_custom::{CreateCustomRequest, CustomIngredientInput},
    domain::{Cocktail, Ingredient, Member, Role, Unit},
    ports::{catalog::CatalogPort, database::DatabasePort, image::ImagePort},
};

pub const MARTINI: i64 = 1;
pub const MANHATTAN: i64 = 2;
pub const GIN: i64 = 10;
pub const VERMOUTH: i64 = 11;
pub const OLIVE: i64 = 12;
pub const ML: i64 = 100;
pub const PIECE: i64 = 101;

pub type MemoryLogic =
    DomainLogic<MemoryDatabase, MemoryCatalog, MemoryMemberDirectory, MemoryImageStore>;

pub struct World {
    pub database: MemoryDatabase,
    pub image: MemoryImageStore,
    pub owner: Uuid,
    pub other: Uuid,
    pub admin: Uuid,
}

impl World {
    pub fn new() -> Self {
        Self {
            database: MemoryDatabase::default(),
            image: MemoryImageStore::default(),
            owner: Uuid::new_v4(),
            other: Uuid::new_v4(),
            admin: Uuid::new_v4(),
        }
    }

    pub fn catalog(&self) -> MemoryCatalog {
        let catalog = MemoryCatalog::default();
        for (id, name, kr_name) in [(MARTINI, "Martini", "마티니"), (MANHATTAN, "Manhattan", "맨해튼")] {
            catalog
                .insert_cocktail(Cocktail {
                    id,
                    name: name.to_string(),
                    kr_name: kr_name.to_string(),
                    image: format!("https://img.example.com/cocktail/{id}.png"),
                    heart_count: 42,
                })
                .unwrap();
        }
        for (id, name) in [(GIN, "Gin"), (VERMOUTH, "Dry Vermouth"), (OLIVE, "Olive")] {
            catalog
                .insert_ingredient(Ingredient {
                    id,
                    name: name.to_string(),
                    image: format!("https://img.example.com/ingredient/{id}.png"),
                })
                .unwrap();
        }
        for (id, name) in [(ML, "ml"), (PIECE, "piece")] {
            catalog
                .insert_unit(Unit {
                    id,
                    name: name.to_string(),
                })
                .unwrap();
        }
        catalog
    }

    fn members(&self) -> MemoryMemberDirectory {
        let members = MemoryMemberDirectory::default();
        for (member_id, nickname, role) in [
            (self.owner, "owner", Role::User),
            (self.other, "other", Role::User),
            (self.admin, "admin", Role::Admin),
        ] {
            members
                .insert(Member {
                    member_id,
                    nickname: nickname.to_string(),
                    role,
                })
                .unwrap();
        }
        members
    }

    /// Domain logic backed by this world's store and image store
    pub fn logic(&self) -> MemoryLogic {
        self.logic_with_image(self.image.clone())
    }

    pub fn logic_with_image<I: ImagePort>(
        &self,
        image: I,
    ) -> DomainLogic<MemoryDatabase, MemoryCatalog, MemoryMemberDirectory, I> {
        self.logic_with(self.database.clone(), image)
    }

    /// Domain logic with this world's store, image store and members, but the given catalog
    pub fn logic_with_catalog<C: CatalogPort>(
        &self,
        catalog: C,
    ) -> DomainLogic<MemoryDatabase, C, MemoryMemberDirectory, MemoryImageStore> {
        DomainLogic::new(
            Arc::new(self.database.clone()),
            Arc::new(catalog),
            Arc::new(self.members()),
            Arc::new(self.image.clone()),
        )
    }

    /// Domain logic with this world's catalog and members, but the given store and image store
    pub fn logic_with<D: DatabasePort, I: ImagePort>(
        &self,
        database: D,
        image: I,
    ) -> DomainLogic<D, MemoryCatalog, MemoryMemberDirectory, I> {
        DomainLogic::new(
            Arc::new(database),
            Arc::new(self.catalog()),
            Arc::new(self.members()),
            Arc::new(image),
        )
    }
}

pub fn ingredient(ingredient_id: i64, unit_id: i64, amount: f64) -> CustomIngredientInput {
    CustomIngredientInput {
        ingredient_id,
        unit_id,
        amount,
    }
}

pub fn create_request(member_id: Uuid, open: bool) -> CreateCustomRequest {
    CreateCustomRequest {
        member_id,
        image: Some(vec![0xff, 0xd8, 0xff]),
        cocktail_id: MARTINI,
        name: "Dirty Martini".to_string(),
        comment: "Extra brine".to_string(),
        recipe: "Stir with ice, strain".to_string(),
        summary: "Salty martini".to_string(),
        open,
        ingredients: vec![
            ingredient(GIN, ML, 60.0),
            ingredient(VERMOUTH, ML, 10.0),
            ingredient(OLIVE, PIECE, 2.0),
        ],
    }
}
