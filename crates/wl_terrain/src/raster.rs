// crates/wl_terrain/src/raster.rs

//! 栅格数据管理
//!
//! 提供栅格数据的存储、地理变换和网格单元中心采样。
//! 糙率分类图以栅格形式给出，每个像素值是一个类别编号；
//! 采样结果按单元中心坐标取所在像素的值。

use glam::DVec2;
use serde::{Deserialize, Serialize};
use wl_foundation::error::{WlError, WlResult};

/// 北向上栅格的仿射变换（无旋转）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// 左上角 x 坐标
    pub origin_x: f64,
    /// 左上角 y 坐标
    pub origin_y: f64,
    /// 像素宽度（x 方向分辨率，正数）
    pub pixel_width: f64,
    /// 像素高度（y 方向分辨率，正数，行号向南增加）
    pub pixel_height: f64,
}

impl GeoTransform {
    /// 创建仿射变换
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        }
    }

    /// 从 GDAL 六元组创建 `[x0, dx, 0, y0, 0, -dy]`
    ///
    /// GDAL 中像素高度为负，这里取其绝对值。
    pub fn from_gdal(transform: [f64; 6]) -> WlResult<Self> {
        if transform[2] != 0.0 || transform[4] != 0.0 {
            return Err(WlError::invalid_input("不支持带旋转的栅格变换"));
        }
        let gt = Self::new(transform[0], transform[3], transform[1], -transform[5]);
        if !(gt.pixel_width > 0.0) || !(gt.pixel_height > 0.0) {
            return Err(WlError::invalid_input(format!(
                "像素尺寸必须为正: ({}, {})",
                gt.pixel_width, gt.pixel_height
            )));
        }
        Ok(gt)
    }

    /// 地理坐标转像素坐标（列, 行），含小数部分
    #[inline]
    pub fn geo_to_pixel(&self, p: DVec2) -> DVec2 {
        DVec2::new(
            (p.x - self.origin_x) / self.pixel_width,
            (self.origin_y - p.y) / self.pixel_height,
        )
    }

    /// 像素左上角的地理坐标
    #[inline]
    pub fn pixel_to_geo(&self, col: f64, row: f64) -> DVec2 {
        DVec2::new(
            self.origin_x + col * self.pixel_width,
            self.origin_y - row * self.pixel_height,
        )
    }
}

/// 栅格数据
#[derive(Debug, Clone)]
pub struct RasterData {
    /// 数据（行优先，第 0 行在北侧）
    pub data: Vec<f64>,
    /// 宽度（列数）
    pub width: usize,
    /// 高度（行数）
    pub height: usize,
    /// 无数据值
    pub nodata: f64,
    /// 地理变换
    pub transform: GeoTransform,
}

impl RasterData {
    /// 从数据创建
    pub fn from_data(
        data: Vec<f64>,
        width: usize,
        height: usize,
        nodata: f64,
        transform: GeoTransform,
    ) -> WlResult<Self> {
        WlError::check_size("raster data", width * height, data.len())?;
        Ok(Self {
            data,
            width,
            height,
            nodata,
            transform,
        })
    }

    /// 获取像素值
    #[inline]
    pub fn get(&self, col: usize, row: usize) -> Option<f64> {
        if col < self.width && row < self.height {
            Some(self.data[row * self.width + col])
        } else {
            None
        }
    }

    /// 判断是否为无数据
    #[inline]
    pub fn is_nodata(&self, value: f64) -> bool {
        value.is_nan() || (self.nodata.is_finite() && (value - self.nodata).abs() < 1e-10)
    }

    /// 取点所在像素的值
    ///
    /// 点位于栅格外或像素为无数据时返回 `None`。
    pub fn value_at(&self, p: DVec2) -> Option<f64> {
        let px = self.transform.geo_to_pixel(p);
        if !(px.x >= 0.0) || !(px.y >= 0.0) {
            return None;
        }
        let value = self.get(px.x as usize, px.y as usize)?;
        (!self.is_nodata(value)).then_some(value)
    }

    /// 在网格单元中心采样类别编号
    ///
    /// 栅格外或无数据的单元返回 0。
    pub fn sample_class_ids(&self, centroids: &[DVec2]) -> Vec<i32> {
        centroids
            .iter()
            .map(|&p| self.value_at(p).map_or(0, |v| v as i32))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 3 列 × 2 行，像素 10 m，左上角 (100, 200)
    fn class_map() -> RasterData {
        let data = vec![
            1.0, 2.0, 3.0, //
            4.0, -9999.0, 6.0,
        ];
        RasterData::from_data(data, 3, 2, -9999.0, GeoTransform::new(100.0, 200.0, 10.0, 10.0))
            .unwrap()
    }

    #[test]
    fn test_from_data_size_check() {
        let gt = GeoTransform::new(0.0, 0.0, 1.0, 1.0);
        assert!(RasterData::from_data(vec![0.0; 5], 3, 2, 0.0, gt).is_err());
    }

    #[test]
    fn test_from_gdal() {
        let gt = GeoTransform::from_gdal([100.0, 10.0, 0.0, 200.0, 0.0, -10.0]).unwrap();
        assert_eq!(gt, GeoTransform::new(100.0, 200.0, 10.0, 10.0));
        assert!(GeoTransform::from_gdal([100.0, 10.0, 0.5, 200.0, 0.0, -10.0]).is_err());
        assert!(GeoTransform::from_gdal([100.0, 10.0, 0.0, 200.0, 0.0, 10.0]).is_err());
    }

    #[test]
    fn test_geo_pixel_roundtrip() {
        let gt = GeoTransform::new(100.0, 200.0, 10.0, 10.0);
        let p = gt.pixel_to_geo(2.0, 1.0);
        assert_eq!(p, DVec2::new(120.0, 190.0));
        assert_eq!(gt.geo_to_pixel(p), DVec2::new(2.0, 1.0));
    }

    #[test]
    fn test_sample_class_ids() {
        let raster = class_map();
        let points = [
            DVec2::new(105.0, 195.0), // 第 0 行第 0 列
            DVec2::new(125.0, 195.0), // 第 0 行第 2 列
            DVec2::new(105.0, 185.0), // 第 1 行第 0 列
            DVec2::new(115.0, 185.0), // 无数据
            DVec2::new(95.0, 195.0),  // 西侧栅格外
            DVec2::new(135.0, 195.0), // 东侧栅格外
            DVec2::new(105.0, 205.0), // 北侧栅格外
        ];
        assert_eq!(raster.sample_class_ids(&points), vec![1, 3, 4, 0, 0, 0, 0]);
    }
}
