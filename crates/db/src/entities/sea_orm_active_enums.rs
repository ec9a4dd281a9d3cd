//! String-backed enums stored in status columns.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use cafedesk_core::{order, table};

/// Stored order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Delivered to the table.
    #[sea_orm(string_value = "served")]
    Served,
    /// Charged.
    #[sea_orm(string_value = "billed")]
    Billed,
}

impl From<order::OrderStatus> for OrderStatus {
    fn from(status: order::OrderStatus) -> Self {
        match status {
            order::OrderStatus::Pending => Self::Pending,
            order::OrderStatus::Served => Self::Served,
            order::OrderStatus::Billed => Self::Billed,
        }
    }
}

impl From<OrderStatus> for order::OrderStatus {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Pending => Self::Pending,
            OrderStatus::Served => Self::Served,
            OrderStatus::Billed => Self::Billed,
        }
    }
}

/// Stored table status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    /// Nobody seated.
    #[sea_orm(string_value = "free")]
    Free,
    /// Guests seated.
    #[sea_orm(string_value = "occupied")]
    Occupied,
    /// Held for a party.
    #[sea_orm(string_value = "reserved")]
    Reserved,
}

impl From<table::TableStatus> for TableStatus {
    fn from(status: table::TableStatus) -> Self {
        match status {
            table::TableStatus::Free => Self::Free,
            table::TableStatus::Occupied => Self::Occupied,
            table::TableStatus::Reserved => Self::Reserved,
        }
    }
}

impl From<TableStatus> for table::TableStatus {
    fn from(status: TableStatus) -> Self {
        match status {
            TableStatus::Free => Self::Free,
            TableStatus::Occupied => Self::Occupied,
            TableStatus::Reserved => Self::Reserved,
        }
    }
}
