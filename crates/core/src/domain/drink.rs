//! Drinks and the two views the API hands out.
//!
//! The short view is public, so it carries only what the menu graphic
//! needs (color and proportion). Ingredient names stay in the long view,
//! which is served behind the `get:drinks-detail` permission.

use serde::{Deserialize, Serialize};

use super::lenient::u32_from_int_or_string;
use super::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub color: String,
    pub name: String,
    #[serde(deserialize_with = "u32_from_int_or_string")]
    pub parts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortIngredient {
    pub color: String,
    pub parts: u32,
}

/// Request bodies may carry one ingredient object instead of a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RecipeInput {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl RecipeInput {
    pub fn into_vec(self) -> Vec<Ingredient> {
        match self {
            RecipeInput::Many(items) => items,
            RecipeInput::One(item) => vec![item],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrinkShort {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<ShortIngredient>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrinkLong {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl Drink {
    pub fn short(&self) -> DrinkShort {
        DrinkShort {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .iter()
                .map(|i| ShortIngredient {
                    color: i.color.clone(),
                    parts: i.parts,
                })
                .collect(),
        }
    }

    pub fn long(&self) -> DrinkLong {
        DrinkLong {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl NewDrink {
    pub fn new(title: &str, recipe: Vec<Ingredient>) -> Result<Self, DomainError> {
        Ok(Self {
            title: validate_title(title)?,
            recipe: validate_recipe(recipe)?,
        })
    }
}

/// Partial update for `PATCH /drinks/{id}`; at least one field is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrinkPatch {
    pub title: Option<String>,
    pub recipe: Option<Vec<Ingredient>>,
}

impl DrinkPatch {
    pub fn new(
        title: Option<&str>,
        recipe: Option<Vec<Ingredient>>,
    ) -> Result<Self, DomainError> {
        if title.is_none() && recipe.is_none() {
            return Err(DomainError::EmptyPatch);
        }
        Ok(Self {
            title: title.map(validate_title).transpose()?,
            recipe: recipe.map(validate_recipe).transpose()?,
        })
    }

    pub fn apply(&self, drink: &mut Drink) {
        if let Some(title) = &self.title {
            drink.title = title.clone();
        }
        if let Some(recipe) = &self.recipe {
            drink.recipe = recipe.clone();
        }
    }
}

fn validate_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DomainError::Blank { field: "title" });
    }
    Ok(title.to_string())
}

fn validate_recipe(recipe: Vec<Ingredient>) -> Result<Vec<Ingredient>, DomainError> {
    if recipe.is_empty() {
        return Err(DomainError::EmptyRecipe);
    }
    recipe
        .into_iter()
        .map(|i| {
            let color = i.color.trim();
            if color.is_empty() {
                return Err(DomainError::Blank { field: "recipe.color" });
            }
            let name = i.name.trim();
            if name.is_empty() {
                return Err(DomainError::Blank { field: "recipe.name" });
            }
            if i.parts == 0 {
                return Err(DomainError::InvalidParts);
            }
            Ok(Ingredient {
                color: color.to_string(),
                name: name.to_string(),
                parts: i.parts,
            })
        })
        .collect()
}
