extern crate proc_macro;

use crate::utilities::{find_path_name_value_attr, is_option};

use proc_macro::TokenStream;
use quote::{quote, ToTokens};
use syn::{parse_macro_input, DeriveInput, Path};


pub fn simple_entity_derive_impl(input: TokenStream) -> TokenStream {
    // Parse the input tokens into a syntax tree
    let input = parse_macro_input!(input as DeriveInput);

    let field_names_and_types = match input.data {
        syn::Data::Struct(s) => {
            match s.fields {
                syn::Fields::Named(n) => {
                    n.named.iter().map(|f| (
                        f.ident.clone().expect("Named field without ident"),
                        f.ty.clone(),
                    )).collect::<Vec<_>>()
                },
                _ => panic!("Only named fields are supported")
            }
        }
        _ => panic!("Only structs are supported")
    };

    let (_, id_type) = field_names_and_types.iter().find(|(f, _)| f == "id").expect("Entity must have an id field");
    if !is_option(id_type) {
        panic!("id field must be an Option, it is unset until the entity is saved");
    }

    let name = input.ident;
    let sea_orm_mod_path: Path = find_path_name_value_attr(&input.attrs, "module_path").expect("No module_path attribute found");
    let get_many_pools_func : Option<Path> = find_path_name_value_attr(&input.attrs, "get_many_pools_func");
    let pool_id : Option<Path> = find_path_name_value_attr(&input.attrs, "pool_id");

    let get_pools_func = match (pool_id, get_many_pools_func) {
        (None, None) => panic!("Must have either pool_id or get_many_pools_func attributes"),
        (Some(pool_id), None) => {
            let pool_field_name = pool_id.segments.last().expect("Empty pool_id path").into_token_stream().to_string();
            let (_, pool_type) = field_names_and_types.iter().find(|(f, _)| f.to_string() == pool_field_name).expect("pool_id not found in fields");
            if is_option(pool_type) {
                quote! {
                    async fn get_many_pools<C>(_db: &C, entities: &Vec<&Self>) -> Result<Vec<Option<i32>>, sea_orm::DbErr> where C: sea_orm::ConnectionTrait {
                        Ok(entities.iter().map(|entity| entity.#pool_id).collect())
                    }
                }
            }
            else {
                quote! {
                    async fn get_many_pools<C>(_db: &C, entities: &Vec<&Self>) -> Result<Vec<Option<i32>>, sea_orm::DbErr> where C: sea_orm::ConnectionTrait {
                        Ok(entities.iter().map(|entity| Some(entity.#pool_id)).collect())
                    }
                }
            }
        },
        (None, Some(get_many_pools_func)) => {
            quote! {
                async fn get_many_pools<C>(db: &C, entities: &Vec<&Self>) -> Result<Vec<Option<i32>>, sea_orm::DbErr> where C: sea_orm::ConnectionTrait {
                    Self::#get_many_pools_func(db, entities).await
                }
            }
        },
        (_, _) => panic!("Cannot have both pool_id and get_many_pools_func attributes"),
    };

    let active_value_assignment = field_names_and_types.iter().map(|(f, _)| {
        if f == "id" {
            quote! {
                id: match self.id {
                    Some(id) => sea_orm::ActiveValue::Unchanged(id),
                    None => sea_orm::ActiveValue::NotSet,
                }
            }
        }
        else {
            quote! {
                #f: sea_orm::ActiveValue::Set(self.#f.clone().into())
            }
        }
    }).collect::<Vec<_>>();

    let raw_attr_assignment = field_names_and_types.iter().map(|(f, _)| {
        if f == "id" {
            quote! {
                id: Some(model.id)
            }
        }
        else {
            quote! {
                #f: model.#f.into()
            }
        }
    }).collect::<Vec<_>>();

    let active_model_path = quote! {
        #sea_orm_mod_path::ActiveModel
    };

    let entity_path = quote! {
        #sea_orm_mod_path::Entity
    };

    let model_path = quote! {
        #sea_orm_mod_path::Model
    };

    let expanded = quote! {
        impl #name {
            pub fn into_active_model(&self) -> #active_model_path {
                #active_model_path {
                    #(#active_value_assignment),*
                }
            }

            pub fn from_model(model: #model_path) -> Self {
                Self {
                    #(#raw_attr_assignment),*
                }
            }
        }

        #[async_trait::async_trait]
        impl crate::domain::entity::PoolEntity for #name {
            async fn save<C>(&mut self, db: &C) -> Result<(), sea_orm::DbErr> where C: sea_orm::ConnectionTrait + sea_orm::TransactionTrait {
                use sea_orm::ActiveModelTrait;

                let model = self.into_active_model();
                let saved = match self.id {
                    Some(_) => model.update(db).await?,
                    None => model.insert(db).await?,
                };
                self.id = Some(saved.id);

                Ok(())
            }

            #get_pools_func
        }

        #[async_trait::async_trait]
        impl crate::domain::entity::LoadEntity for #name {
            async fn try_get_many<C>(db: &C, ids: Vec<i32>) -> Result<Vec<Option<Self>>, sea_orm::DbErr> where C: sea_orm::ConnectionTrait {
                let models: Vec<Option<#model_path>> = <#entity_path as crate::utilities::BatchLoad>::batch_load(db, ids).await?;
                Ok(models.into_iter().map(|model| model.map(Self::from_model)).collect())
            }
        }
    };

    TokenStream::from(expanded)
}
